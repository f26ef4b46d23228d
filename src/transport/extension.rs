//! Browser-extension bridge transport
//!
//! A CORS-bypassing browser extension can expose a local forwarding URL.
//! Detection probes `{base}/health` once at startup with a short timeout so
//! it can never block launch; a failed probe simply disables the strategy
//! for the session. Sends wrap the brand-translated request in
//! `POST {base}/forward`, and the bridge, which can read real responses,
//! answers `{success, error}`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{Delivery, Envelope, RelayAck, Transport, TransportError, TransportKind};
use crate::device::Device;
use crate::translate::WireRequest;

/// Forwarding body handed to the extension bridge
#[derive(Debug, Serialize)]
struct ForwardRequest<'a> {
    #[serde(flatten)]
    wire: &'a WireRequest,
}

/// Relay through a browser-extension bridge, when one is present
pub struct ExtensionTransport {
    client: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
    detected: AtomicBool,
}

impl ExtensionTransport {
    /// Create the transport against the conventional bridge URL
    #[must_use]
    pub fn new(base_url: String, timeout: Duration, probe_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            probe_timeout,
            detected: AtomicBool::new(false),
        }
    }

    /// Probe the bridge once at startup
    pub async fn detect(&self) {
        let url = format!("{}/health", self.base_url);
        let result = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await;
        let found = matches!(result, Ok(ref r) if r.status().is_success());
        self.detected.store(found, Ordering::Relaxed);
        if found {
            tracing::info!(url = %self.base_url, "extension bridge detected");
        } else {
            tracing::debug!(url = %self.base_url, "no extension bridge; strategy disabled for this session");
        }
    }
}

#[async_trait]
impl Transport for ExtensionTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Extension
    }

    fn ready(&self) -> bool {
        self.detected.load(Ordering::Relaxed)
    }

    async fn probe(&self, _device: &Device) -> bool {
        self.ready()
    }

    async fn send(&self, envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        if !self.ready() {
            return Err(TransportError::ExtensionUnavailable);
        }

        let url = format!("{}/forward", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ForwardRequest {
                wire: envelope.wire,
            })
            .send()
            .await
            .map_err(|e| TransportError::from_http(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        let ack: RelayAck = response
            .json()
            .await
            .map_err(|e| TransportError::Network(format!("malformed bridge response: {e}")))?;
        ack.into_delivery()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::device::Brand;

    #[tokio::test]
    async fn undetected_bridge_refuses_sends() {
        let transport = ExtensionTransport::new(
            "http://127.0.0.1:1/".to_string(),
            Duration::from_millis(50),
            Duration::from_millis(50),
        );
        assert!(!transport.ready());

        let device = Device::new("tv", Brand::Samsung, "192.168.1.60");
        let command = Command::Mute;
        let wire = crate::translate::translator_for(Brand::Samsung)
            .translate(&device, &command)
            .unwrap();
        let err = transport
            .send(Envelope {
                device: &device,
                command: &command,
                wire: &wire,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::ExtensionUnavailable));
    }

    #[test]
    fn forward_request_flattens_the_wire_shape() {
        let device = Device::new("tv", Brand::Samsung, "192.168.1.60");
        let wire = crate::translate::translator_for(Brand::Samsung)
            .translate(&device, &Command::Mute)
            .unwrap();
        let json = serde_json::to_value(ForwardRequest { wire: &wire }).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["url"], "http://192.168.1.60:8001/api/v2/keys/KEY_MUTE");
    }
}
