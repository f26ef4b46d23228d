//! Dispatch integration tests
//!
//! Exercises the strategy walk end to end with mock transports

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tvlink_gateway::{
    Attempt, Brand, Command, CommandOutcome, Delivery, DeliveryMethod, Device, Dispatcher,
    Envelope, ErrorKind, Transport, TransportError, TransportKind,
};

/// Mock transport with a scripted result and a shared call log
struct MockTransport {
    kind: TransportKind,
    ready: bool,
    result: Result<Delivery, TransportError>,
    log: Arc<Mutex<Vec<TransportKind>>>,
}

impl MockTransport {
    fn ok(kind: TransportKind, confirmed: bool, log: &Arc<Mutex<Vec<TransportKind>>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            ready: true,
            result: Ok(if confirmed {
                Delivery::confirmed()
            } else {
                Delivery::unconfirmed()
            }),
            log: Arc::clone(log),
        })
    }

    fn err(
        kind: TransportKind,
        error: TransportError,
        log: &Arc<Mutex<Vec<TransportKind>>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            kind,
            ready: true,
            result: Err(error),
            log: Arc::clone(log),
        })
    }

    fn not_ready(kind: TransportKind, log: &Arc<Mutex<Vec<TransportKind>>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            ready: false,
            result: Err(TransportError::Network("unused".to_string())),
            log: Arc::clone(log),
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn ready(&self) -> bool {
        self.ready
    }

    async fn probe(&self, _device: &Device) -> bool {
        self.ready
    }

    async fn send(&self, _envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        self.log.lock().await.push(self.kind);
        self.result.clone()
    }
}

fn roku() -> Device {
    Device::new("Living Room", Brand::Roku, "192.168.1.50")
}

fn dispatcher(strategies: Vec<Arc<dyn Transport>>) -> Dispatcher {
    Dispatcher::with_strategies(strategies, Duration::from_secs(8))
}

#[tokio::test]
async fn first_success_stops_the_walk() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![
        MockTransport::err(
            TransportKind::Webrtc,
            TransportError::SignalingUnavailable,
            &log,
        ),
        MockTransport::ok(TransportKind::Proxy, true, &log),
        MockTransport::ok(TransportKind::Extension, true, &log),
        MockTransport::ok(TransportKind::Direct, false, &log),
    ]);

    let outcome = dispatcher.send_command(Some(&roku()), &Command::VolumeUp).await;

    assert!(outcome.success);
    assert_eq!(outcome.method, DeliveryMethod::Proxy);
    assert!(outcome.confirmed);

    // Nothing after the proxy was touched.
    let calls = log.lock().await.clone();
    assert_eq!(calls, vec![TransportKind::Webrtc, TransportKind::Proxy]);
}

#[tokio::test]
async fn strategies_run_in_fixed_priority_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![
        MockTransport::err(
            TransportKind::Webrtc,
            TransportError::SignalingUnavailable,
            &log,
        ),
        MockTransport::err(TransportKind::Proxy, TransportError::ProxyUnavailable, &log),
        MockTransport::err(
            TransportKind::Extension,
            TransportError::ExtensionUnavailable,
            &log,
        ),
        MockTransport::ok(TransportKind::Direct, false, &log),
    ]);

    let outcome = dispatcher.send_command(Some(&roku()), &Command::Up).await;

    assert!(outcome.success);
    assert_eq!(outcome.method, DeliveryMethod::Direct);
    // Direct delivery completes without acknowledgment.
    assert!(!outcome.confirmed);

    let calls = log.lock().await.clone();
    assert_eq!(
        calls,
        vec![
            TransportKind::Webrtc,
            TransportKind::Proxy,
            TransportKind::Extension,
            TransportKind::Direct,
        ]
    );
}

#[tokio::test]
async fn exhaustion_aggregates_to_the_most_specific_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![
        MockTransport::err(
            TransportKind::Webrtc,
            TransportError::Timeout(Duration::from_secs(8)),
            &log,
        ),
        MockTransport::err(TransportKind::Proxy, TransportError::Status(404), &log),
        MockTransport::err(
            TransportKind::Direct,
            TransportError::Network("unreachable".to_string()),
            &log,
        ),
    ]);

    let outcome = dispatcher.send_command(Some(&roku()), &Command::Power).await;

    assert!(!outcome.success);
    assert_eq!(outcome.method, DeliveryMethod::None);
    // The proxy's 404 is the most diagnostic signal of the three.
    assert_eq!(outcome.error_kind, Some(ErrorKind::NotFound));
    assert!(!outcome.troubleshooting.is_empty());
    // Brand guidance rides along.
    assert!(
        outcome
            .troubleshooting
            .iter()
            .any(|s| s.starts_with("Roku:"))
    );
}

#[tokio::test]
async fn undetected_strategies_are_skipped_but_recorded() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![
        MockTransport::not_ready(TransportKind::Proxy, &log),
        MockTransport::err(
            TransportKind::Direct,
            TransportError::Timeout(Duration::from_secs(8)),
            &log,
        ),
    ]);

    let outcome = dispatcher.send_command(Some(&roku()), &Command::Ok).await;

    assert!(!outcome.success);
    // The skipped proxy never saw a send call.
    let calls = log.lock().await.clone();
    assert_eq!(calls, vec![TransportKind::Direct]);
    // Timeout outranks proxy absence in the aggregate.
    assert_eq!(outcome.error_kind, Some(ErrorKind::Timeout));
}

#[tokio::test]
async fn no_selected_device_touches_no_transport() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![MockTransport::ok(TransportKind::Direct, false, &log)]);

    let outcome = dispatcher.send_command(None, &Command::Power).await;

    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("no device selected"));
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn translation_failure_touches_no_transport() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![MockTransport::ok(TransportKind::Direct, false, &log)]);

    // Samsung has no app-launch endpoint in this protocol.
    let device = Device::new("Bedroom", Brand::Samsung, "192.168.1.60");
    let outcome = dispatcher
        .send_command(Some(&device), &Command::LaunchApp("netflix".to_string()))
        .await;

    assert!(!outcome.success);
    assert!(log.lock().await.is_empty());

    // Unknown Roku channel short-circuits the same way.
    let outcome = dispatcher
        .send_command(
            Some(&roku()),
            &Command::LaunchApp("definitely-not-a-channel".to_string()),
        )
        .await;
    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::NotFound));
    assert!(log.lock().await.is_empty());
}

#[tokio::test]
async fn dispatch_is_repeatable() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = dispatcher(vec![MockTransport::ok(TransportKind::Direct, false, &log)]);
    let device = roku();

    let first = dispatcher.send_command(Some(&device), &Command::VolumeDown).await;
    let second = dispatcher.send_command(Some(&device), &Command::VolumeDown).await;

    assert!(first.success && second.success);
    assert_eq!(log.lock().await.len(), 2);
}

#[tokio::test]
async fn slow_strategy_times_out_and_the_walk_continues() {
    /// Transport whose send never completes
    struct StuckTransport {
        kind: TransportKind,
    }

    #[async_trait]
    impl Transport for StuckTransport {
        fn kind(&self) -> TransportKind {
            self.kind
        }

        async fn probe(&self, _device: &Device) -> bool {
            true
        }

        async fn send(&self, _envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
            std::future::pending().await
        }
    }

    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = Dispatcher::with_strategies(
        vec![
            Arc::new(StuckTransport {
                kind: TransportKind::Proxy,
            }),
            MockTransport::ok(TransportKind::Direct, false, &log),
        ],
        Duration::from_millis(50),
    );

    let outcome = dispatcher.send_command(Some(&roku()), &Command::Home).await;

    assert!(outcome.success);
    assert_eq!(outcome.method, DeliveryMethod::Direct);
}

#[test]
fn attempt_and_outcome_are_plain_data() {
    let attempt = Attempt {
        kind: TransportKind::Direct,
        error: TransportError::Status(500),
    };
    assert_eq!(attempt.kind, TransportKind::Direct);

    let outcome = CommandOutcome::delivered(TransportKind::Webrtc, true);
    assert_eq!(outcome.method, DeliveryMethod::Webrtc);
}
