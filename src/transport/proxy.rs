//! Local proxy transport
//!
//! A companion proxy server on the same host can relay commands to the TV
//! and read real responses. Detection runs once per session: each candidate
//! port is probed for `GET /health` with a short timeout, and the first one
//! answering 200 is used for every subsequent send. If none answers, the
//! strategy stays unavailable for the session and is not re-probed per
//! command.
//!
//! Send contract: `POST /tv-command` with `{tvIP, tvBrand, command, value}`,
//! answered by `{success, error}`.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use super::{Delivery, Envelope, RelayAck, Transport, TransportError, TransportKind};
use crate::device::Device;

/// Command body relayed to the proxy server
///
/// Field names are the proxy's wire contract, not ours.
#[derive(Debug, Serialize)]
struct ProxyCommand<'a> {
    #[serde(rename = "tvIP")]
    tv_ip: &'a str,
    #[serde(rename = "tvBrand")]
    tv_brand: &'a str,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<serde_json::Value>,
}

/// Relay through a local proxy server, when one is running
pub struct ProxyTransport {
    client: reqwest::Client,
    candidate_ports: Vec<u16>,
    probe_timeout: Duration,
    endpoint: RwLock<Option<u16>>,
}

impl ProxyTransport {
    /// Create the transport
    ///
    /// `timeout` bounds each send; `probe_timeout` bounds each per-port
    /// health probe during [`ProxyTransport::detect`].
    #[must_use]
    pub fn new(candidate_ports: Vec<u16>, timeout: Duration, probe_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            candidate_ports,
            probe_timeout,
            endpoint: RwLock::new(None),
        }
    }

    /// Probe the candidate ports for a health endpoint, once per session
    pub async fn detect(&self) {
        for &port in &self.candidate_ports {
            let url = format!("http://127.0.0.1:{port}/health");
            let result = self
                .client
                .get(&url)
                .timeout(self.probe_timeout)
                .send()
                .await;
            if matches!(result, Ok(ref r) if r.status().is_success()) {
                tracing::info!(port, "local proxy server detected");
                if let Ok(mut endpoint) = self.endpoint.write() {
                    *endpoint = Some(port);
                }
                return;
            }
        }
        tracing::debug!(
            ports = ?self.candidate_ports,
            "no local proxy server detected; strategy disabled for this session"
        );
    }

    fn port(&self) -> Option<u16> {
        self.endpoint.read().ok().and_then(|p| *p)
    }
}

#[async_trait]
impl Transport for ProxyTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Proxy
    }

    fn ready(&self) -> bool {
        self.port().is_some()
    }

    async fn probe(&self, _device: &Device) -> bool {
        // The proxy fronts every device; reachability of the proxy itself is
        // the only thing this strategy can test.
        self.port().is_some()
    }

    async fn send(&self, envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        let port = self.port().ok_or(TransportError::ProxyUnavailable)?;
        let url = format!("http://127.0.0.1:{port}/tv-command");
        let body = ProxyCommand {
            tv_ip: &envelope.device.addr,
            tv_brand: envelope.device.brand.as_str(),
            command: envelope.command.name(),
            value: envelope.command.value(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
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
            .map_err(|e| TransportError::Network(format!("malformed proxy response: {e}")))?;
        ack.into_delivery()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::Brand;

    #[test]
    fn proxy_command_uses_the_wire_field_names() {
        let cmd = ProxyCommand {
            tv_ip: "192.168.1.50",
            tv_brand: Brand::Roku.as_str(),
            command: "volume_up",
            value: None,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["tvIP"], "192.168.1.50");
        assert_eq!(json["tvBrand"], "roku");
        assert_eq!(json["command"], "volume_up");
        assert!(json.get("value").is_none());
    }

    #[tokio::test]
    async fn undetected_proxy_is_not_ready_and_refuses_sends() {
        let transport = ProxyTransport::new(
            vec![1],
            Duration::from_millis(50),
            Duration::from_millis(50),
        );
        assert!(!transport.ready());

        let device = Device::new("tv", Brand::Roku, "192.168.1.50");
        let command = crate::command::Command::VolumeUp;
        let wire = crate::translate::translator_for(Brand::Roku)
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
        assert!(matches!(err, TransportError::ProxyUnavailable));
    }
}
