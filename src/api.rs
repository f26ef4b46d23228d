//! HTTP control API
//!
//! A small local server so remotes (web UI, shortcuts, scripts) can drive the
//! gateway: list and select devices, send commands, inspect connection
//! status, and tear down per-device transport state. Handlers are thin
//! wrappers over [`Session`]; all the dispatch and diagnosis behavior lives
//! below this layer.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::command::Command;
use crate::device::{Brand, Device};
use crate::diagnose::CommandOutcome;
use crate::discovery::MdnsScanner;
use crate::session::{ConnectionStatus, Session, SessionReply};

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Gateway status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub version: &'static str,
    pub status: ConnectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<CommandOutcome>,
}

/// Device list response
#[derive(Serialize)]
pub struct DeviceListResponse {
    pub devices: Vec<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
}

/// Request body for adding a device by hand
#[derive(Deserialize)]
pub struct AddDeviceRequest {
    pub name: String,
    pub brand: Brand,
    pub addr: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Request body for sending a command
#[derive(Deserialize)]
pub struct CommandRequest {
    pub command: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Target device id; defaults to the selected device
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Error body for non-2xx responses
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Liveness probe - is the gateway running?
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Connection status, selection, and last dispatch outcome
async fn status(State(session): State<Arc<Session>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION"),
        status: session.status().await,
        selected: session.selected().await,
        last_outcome: session.last_outcome().await,
    })
}

/// List known devices
async fn list_devices(State(session): State<Arc<Session>>) -> Json<DeviceListResponse> {
    let devices = session.devices().await;
    let selected_id = session.selected().await.map(|d| d.id);
    Json(DeviceListResponse {
        devices,
        selected_id,
    })
}

/// Add a device by hand
async fn add_device(
    State(session): State<Arc<Session>>,
    Json(req): Json<AddDeviceRequest>,
) -> (StatusCode, Json<Device>) {
    let mut device = Device::new(req.name, req.brand, req.addr);
    device.model = req.model;
    session.upsert_device(device.clone()).await;
    (StatusCode::CREATED, Json(device))
}

/// Select the device future commands go to
async fn select_device(
    State(session): State<Arc<Session>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, (StatusCode, Json<ErrorResponse>)> {
    session
        .select_device(&id)
        .await
        .map(Json)
        .map_err(|e| not_found(e.to_string()))
}

/// Dispatch a command
///
/// Always replies 200 with a structured outcome; a failed dispatch is a
/// normal result carrying its diagnosis, not an HTTP error.
async fn send_command(
    State(session): State<Arc<Session>>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<SessionReply>, (StatusCode, Json<ErrorResponse>)> {
    let command = Command::parse(&req.command, req.value.as_deref())
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e.to_string() })))?;

    let reply = match req.device_id {
        Some(id) => {
            let device = session
                .find_device(&id)
                .await
                .map_err(|e| not_found(e.to_string()))?;
            session.send_to(Some(device), &command).await
        }
        None => session.send(&command).await,
    };
    Ok(Json(reply))
}

/// Query parameters for a scan request
#[derive(Deserialize)]
pub struct ScanParams {
    /// Scan window, seconds
    #[serde(default = "default_scan_window")]
    pub window_secs: u64,
}

const fn default_scan_window() -> u64 {
    3
}

/// Scan the network and merge what resolves into the registry
async fn scan_devices(
    State(session): State<Arc<Session>>,
    Query(params): Query<ScanParams>,
) -> Result<Json<DeviceListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let unavailable = |e: crate::Error| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    };

    let scanner = MdnsScanner::new().map_err(unavailable)?;
    let found = scanner
        .scan(Duration::from_secs(params.window_secs))
        .await
        .map_err(unavailable)?;
    for device in found {
        session.upsert_device(device).await;
    }

    let devices = session.devices().await;
    let selected_id = session.selected().await.map(|d| d.id);
    Ok(Json(DeviceListResponse {
        devices,
        selected_id,
    }))
}

/// Tear down transport state for a device
async fn disconnect(
    State(session): State<Arc<Session>>,
    Path(id): Path<String>,
) -> StatusCode {
    session.disconnect(&id).await;
    StatusCode::NO_CONTENT
}

/// Acknowledge a dismissed failure dialog
async fn dismiss_error(State(session): State<Arc<Session>>) -> StatusCode {
    session.dismiss_error().await;
    StatusCode::NO_CONTENT
}

/// Build the router with all routes
pub fn router(session: Arc<Session>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/devices", get(list_devices).post(add_device))
        .route("/api/devices/{id}/select", post(select_device))
        .route("/api/scan", post(scan_devices))
        .route("/api/command", post(send_command))
        .route("/api/disconnect/{id}", post(disconnect))
        .route("/api/error/dismiss", post(dismiss_error))
        .with_state(session)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the control API server
///
/// # Errors
///
/// Returns error if the server fails to bind or run.
pub async fn serve(session: Arc<Session>, port: u16) -> crate::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| crate::Error::Api(format!("failed to bind control API: {e}")))?;

    tracing::info!(port, "control API listening");

    axum::serve(listener, router(session))
        .await
        .map_err(|e| crate::Error::Api(format!("control API error: {e}")))?;

    Ok(())
}
