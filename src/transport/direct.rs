//! Direct HTTP transport
//!
//! Sends the brand-translated request straight to the set. Last in the
//! dispatch order: most TVs accept the HTTP exchange whether or not the
//! command is acted on (Samsung's real control channel is a paired
//! WebSocket, LG's is likewise), so a 2xx here is reported as an
//! *unconfirmed* delivery. Error statuses are still meaningful and feed
//! the classifier.

use std::time::Duration;

use async_trait::async_trait;

use super::{Delivery, Envelope, Transport, TransportError, TransportKind};
use crate::device::Device;
use crate::translate::{WireMethod, WireRequest, profile};

/// Plain HTTP delivery to the device's own control endpoint
pub struct DirectTransport {
    client: reqwest::Client,
    probe_timeout: Duration,
}

impl DirectTransport {
    /// Create the transport
    ///
    /// `timeout` bounds each send, `probe_timeout` bounds connectivity tests.
    #[must_use]
    pub fn new(timeout: Duration, probe_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            probe_timeout,
        }
    }

    async fn execute(&self, wire: &WireRequest) -> Result<reqwest::Response, TransportError> {
        let builder = match wire.method {
            WireMethod::Get => self.client.get(&wire.url),
            WireMethod::Post => self.client.post(&wire.url),
        };
        let builder = match &wire.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        builder
            .send()
            .await
            .map_err(|e| TransportError::from_http(&e))
    }
}

#[async_trait]
impl Transport for DirectTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Direct
    }

    async fn probe(&self, device: &Device) -> bool {
        // Any response, even an error status, means something is listening
        // on the brand's control port.
        let url = format!("http://{}:{}/", device.addr, profile(device.brand).port);
        let result = self
            .client
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await;
        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(device = %device.name, error = %e, "direct probe failed");
                false
            }
        }
    }

    async fn send(&self, envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        let response = self.execute(envelope.wire).await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                device = %envelope.device.name,
                command = %envelope.command,
                "direct send completed (unconfirmed)"
            );
            Ok(Delivery::unconfirmed())
        } else {
            Err(TransportError::Status(status.as_u16()))
        }
    }
}
