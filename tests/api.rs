//! Control API integration tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use tvlink_gateway::{
    Brand, Delivery, Device, DeviceRegistry, Dispatcher, Envelope, Session, Transport,
    TransportError, TransportKind, api,
};

/// Transport that always succeeds without touching the network
struct AlwaysDelivers;

#[async_trait]
impl Transport for AlwaysDelivers {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    async fn probe(&self, _device: &Device) -> bool {
        true
    }

    async fn send(&self, _envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        Ok(Delivery::unconfirmed())
    }
}

fn test_session() -> Arc<Session> {
    let dispatcher = Arc::new(Dispatcher::with_strategies(
        vec![Arc::new(AlwaysDelivers)],
        Duration::from_secs(1),
    ));
    let mut registry = DeviceRegistry::new();
    registry.upsert(Device::new("Living Room", Brand::Roku, "192.168.1.50"));
    Arc::new(Session::new(dispatcher, registry))
}

fn json_post(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_ok_and_version() {
    let router = api::router(test_session());
    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn devices_lists_the_registry() {
    let router = api::router(test_session());
    let response = router
        .oneshot(Request::get("/api/devices").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["devices"].as_array().unwrap().len(), 1);
    assert_eq!(json["devices"][0]["name"], "Living Room");
    assert!(json.get("selected_id").is_none());
}

#[tokio::test]
async fn select_then_command_round_trip() {
    let session = test_session();
    let id = session.devices().await[0].id.clone();
    let router = api::router(Arc::clone(&session));

    let response = router
        .clone()
        .oneshot(json_post(
            &format!("/api/devices/{id}/select"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(json_post(
            "/api/command",
            &serde_json::json!({ "command": "volume_up" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["method"], "direct");
    assert_eq!(json["confirmed"], false);
    assert_eq!(json["status"], "connected");
}

#[tokio::test]
async fn select_unknown_device_is_404() {
    let router = api::router(test_session());
    let response = router
        .oneshot(json_post(
            "/api/devices/no-such-id/select",
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn command_without_selection_is_a_structured_failure() {
    let router = api::router(test_session());
    let response = router
        .oneshot(json_post(
            "/api/command",
            &serde_json::json!({ "command": "power" }),
        ))
        .await
        .unwrap();

    // Dispatch failures are results, not HTTP errors.
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "no device selected");
    assert_eq!(json["status"], "disconnected");
    assert_eq!(json["present_error"], true);
}

#[tokio::test]
async fn malformed_command_is_400() {
    let router = api::router(test_session());
    let response = router
        .oneshot(json_post(
            "/api/command",
            &serde_json::json!({ "command": "launch_app" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn command_can_target_a_device_by_name() {
    let router = api::router(test_session());
    let response = router
        .oneshot(json_post(
            "/api/command",
            &serde_json::json!({ "command": "home", "device_id": "Living Room" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn add_device_then_list_includes_it() {
    let router = api::router(test_session());
    let response = router
        .clone()
        .oneshot(json_post(
            "/api/devices",
            &serde_json::json!({
                "name": "Bedroom",
                "brand": "samsung",
                "addr": "192.168.1.60",
                "model": "QN90C"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(Request::get("/api/devices").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["devices"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn disconnect_returns_no_content() {
    let session = test_session();
    let id = session.devices().await[0].id.clone();
    let router = api::router(session);

    let response = router
        .oneshot(json_post(
            &format!("/api/disconnect/{id}"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn status_reflects_the_last_outcome() {
    let session = test_session();
    let id = session.devices().await[0].id.clone();
    let router = api::router(Arc::clone(&session));

    let _ = router
        .clone()
        .oneshot(json_post(
            &format!("/api/devices/{id}/select"),
            &serde_json::json!({}),
        ))
        .await
        .unwrap();
    let _ = router
        .clone()
        .oneshot(json_post(
            "/api/command",
            &serde_json::json!({ "command": "mute" }),
        ))
        .await
        .unwrap();

    let response = router
        .oneshot(Request::get("/api/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["status"], "connected");
    assert_eq!(json["selected"]["id"], id);
    assert_eq!(json["last_outcome"]["success"], true);
}
