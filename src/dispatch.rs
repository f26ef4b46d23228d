//! Command dispatch
//!
//! One dispatch translates a logical command for the target device's brand,
//! then walks the transport strategies in fixed priority order — peer data
//! channel, local proxy, extension bridge, direct HTTP — stopping at the
//! first success. Strategies run sequentially, never raced, each under its
//! own timeout; a failure is caught, recorded, and never aborts the walk.
//! When every strategy has failed, the recorded attempts go through the
//! classifier and the caller gets a structured failure with guidance.
//!
//! The dispatcher is an explicitly constructed instance with its own
//! lifecycle: [`Dispatcher::init`] runs the once-per-session proxy and
//! extension detection, [`Dispatcher::shutdown`] tears down cached peer
//! sessions. It holds no UI state; reacting to an outcome (volume display,
//! error dialogs) is the caller's job.

use std::sync::Arc;
use std::time::Duration;

use crate::command::Command;
use crate::config::Config;
use crate::device::Device;
use crate::diagnose::{self, CommandOutcome, ErrorKind};
use crate::translate::{TranslateError, translator_for};
use crate::transport::{
    Attempt, DirectTransport, Envelope, ExtensionTransport, NoSignalingConnector, PeerConnector,
    PeerTransport, ProxyTransport, Transport, TransportError,
};

/// Fixed-priority command dispatcher
pub struct Dispatcher {
    strategies: Vec<Arc<dyn Transport>>,
    peer: Option<Arc<PeerTransport>>,
    proxy: Option<Arc<ProxyTransport>>,
    extension: Option<Arc<ExtensionTransport>>,
    attempt_timeout: Duration,
}

impl Dispatcher {
    /// Build the full production strategy stack from configuration
    ///
    /// Uses [`NoSignalingConnector`] for peer sessions; see the transport
    /// module for why.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_connector(config, Arc::new(NoSignalingConnector))
    }

    /// Build the full stack with an explicit peer connector
    #[must_use]
    pub fn with_connector(config: &Config, connector: Arc<dyn PeerConnector>) -> Self {
        let peer = Arc::new(PeerTransport::new(
            connector,
            config.peer_connect_timeout(),
            config.peer_ack_timeout(),
        ));
        let proxy = Arc::new(ProxyTransport::new(
            config.proxy_ports.clone(),
            config.attempt_timeout(),
            config.probe_timeout(),
        ));
        let extension = Arc::new(ExtensionTransport::new(
            config.extension_url.clone(),
            config.attempt_timeout(),
            config.probe_timeout(),
        ));
        let direct = Arc::new(DirectTransport::new(
            config.attempt_timeout(),
            config.probe_timeout(),
        ));

        Self {
            strategies: vec![
                Arc::clone(&peer) as Arc<dyn Transport>,
                Arc::clone(&proxy) as Arc<dyn Transport>,
                Arc::clone(&extension) as Arc<dyn Transport>,
                direct,
            ],
            peer: Some(peer),
            proxy: Some(proxy),
            extension: Some(extension),
            attempt_timeout: config.attempt_timeout(),
        }
    }

    /// Build a dispatcher over an arbitrary strategy list (tests)
    #[must_use]
    pub fn with_strategies(
        strategies: Vec<Arc<dyn Transport>>,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            peer: None,
            proxy: None,
            extension: None,
            attempt_timeout,
        }
    }

    /// Run the once-per-session strategy detection
    ///
    /// Proxy and extension probes run concurrently, each bounded by the
    /// configured probe timeout, so startup is never blocked on a helper
    /// that is not there.
    pub async fn init(&self) {
        match (&self.proxy, &self.extension) {
            (Some(proxy), Some(extension)) => {
                tokio::join!(proxy.detect(), extension.detect());
            }
            (Some(proxy), None) => proxy.detect().await,
            (None, Some(extension)) => extension.detect().await,
            (None, None) => {}
        }
    }

    /// Tear down cached peer sessions
    pub async fn shutdown(&self) {
        if let Some(peer) = &self.peer {
            peer.shutdown().await;
        }
    }

    /// Tear down the cached peer session for one device
    pub async fn disconnect(&self, device_id: &str) {
        if let Some(peer) = &self.peer {
            peer.disconnect(device_id).await;
        }
    }

    /// Connectivity-test every strategy against a device
    ///
    /// Probe success on a strategy does not guarantee command success on it;
    /// the two operations are independent by contract.
    pub async fn probe(&self, device: &Device) -> Vec<(crate::transport::TransportKind, bool)> {
        let mut results = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let reachable = tokio::time::timeout(self.attempt_timeout, strategy.probe(device))
                .await
                .unwrap_or(false);
            results.push((strategy.kind(), reachable));
        }
        results
    }

    /// Dispatch one logical command to a device
    ///
    /// `device = None` (nothing selected) and translation failures short
    /// circuit without touching any transport.
    pub async fn send_command(&self, device: Option<&Device>, command: &Command) -> CommandOutcome {
        let Some(device) = device else {
            return CommandOutcome::failed(
                ErrorKind::Unknown,
                "no device selected",
                vec!["Select a device before sending commands".to_string()],
            );
        };

        let wire = match translator_for(device.brand).translate(device, command) {
            Ok(wire) => wire,
            Err(err) => {
                tracing::warn!(device = %device.name, command = %command, error = %err, "translation failed");
                return translation_failure(&err);
            }
        };

        let envelope = Envelope {
            device,
            command,
            wire: &wire,
        };
        let mut attempts: Vec<Attempt> = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let kind = strategy.kind();

            if !strategy.ready() {
                // Detection already ruled this strategy out for the session;
                // record why so the aggregate diagnosis can mention it.
                attempts.push(Attempt {
                    kind,
                    error: unavailable_error(kind),
                });
                continue;
            }

            let result = tokio::time::timeout(self.attempt_timeout, strategy.send(envelope))
                .await
                .unwrap_or(Err(TransportError::Timeout(self.attempt_timeout)));

            match result {
                Ok(delivery) => {
                    tracing::info!(
                        device = %device.name,
                        command = %command,
                        strategy = %kind,
                        confirmed = delivery.confirmed,
                        "command delivered"
                    );
                    return CommandOutcome::delivered(kind, delivery.confirmed);
                }
                Err(error) => {
                    tracing::debug!(
                        device = %device.name,
                        strategy = %kind,
                        error = %error,
                        "strategy failed, trying next"
                    );
                    attempts.push(Attempt { kind, error });
                }
            }
        }

        tracing::warn!(
            device = %device.name,
            command = %command,
            attempts = attempts.len(),
            "all transport strategies failed"
        );
        diagnose::classify(&attempts, device.brand)
    }
}

fn unavailable_error(kind: crate::transport::TransportKind) -> TransportError {
    match kind {
        crate::transport::TransportKind::Proxy => TransportError::ProxyUnavailable,
        crate::transport::TransportKind::Extension => TransportError::ExtensionUnavailable,
        _ => TransportError::Network("strategy unavailable".to_string()),
    }
}

/// Surface a translation failure as an outcome, without transport attempts
fn translation_failure(err: &TranslateError) -> CommandOutcome {
    let kind = match err {
        TranslateError::UnknownApp { .. } => ErrorKind::NotFound,
        TranslateError::UnsupportedCommand { .. } => ErrorKind::Unknown,
    };
    CommandOutcome::failed(
        kind,
        err.to_string(),
        vec![
            "This command cannot be expressed for the device's brand".to_string(),
            "Try a different command, or control the TV with the vendor app".to_string(),
        ],
    )
}
