//! Peer data-channel transport
//!
//! Commands ride an ordered data channel as JSON and are answered by a JSON
//! acknowledgement, which makes this the preferred strategy when a session
//! can be established. Sessions are cached per device id and reused across
//! dispatches; `disconnect` and `shutdown` tear them down explicitly.
//!
//! Establishing a session needs a signaling path to exchange the local
//! offer for the device's answer. No such pairing channel is defined for
//! consumer TVs today, so the default [`NoSignalingConnector`] fails fast
//! with [`TransportError::SignalingUnavailable`] rather than hanging on an
//! exchange that can never complete. Defining a real per-brand pairing
//! handshake is a product decision, not something this layer guesses at;
//! the session machinery is connector-agnostic so a real connector slots in
//! behind [`PeerConnector`] without touching the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Delivery, Envelope, RelayAck, Transport, TransportError, TransportKind};
use crate::device::Device;

/// An established, ordered data channel to one device
#[async_trait]
pub trait PeerChannel: Send + Sync {
    /// Send one JSON payload and await the JSON acknowledgement
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Timeout`] when no acknowledgement arrives
    /// within the deadline, or [`TransportError::Peer`] when the channel
    /// breaks.
    async fn request(
        &self,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<RelayAck, TransportError>;

    /// Close the channel and its underlying connection
    async fn close(&self);
}

/// Strategy for establishing peer sessions
#[async_trait]
pub trait PeerConnector: Send + Sync {
    /// Establish a session to a device within the deadline
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::SignalingUnavailable`] when no signaling
    /// path exists, [`TransportError::Timeout`] on expiry, or
    /// [`TransportError::Peer`] on negotiation failure.
    async fn connect(
        &self,
        device: &Device,
        timeout: Duration,
    ) -> Result<Arc<dyn PeerChannel>, TransportError>;
}

/// The shipping connector: no signaling channel exists, so establishment
/// fails fast instead of dangling an offer nobody will answer
pub struct NoSignalingConnector;

#[async_trait]
impl PeerConnector for NoSignalingConnector {
    async fn connect(
        &self,
        device: &Device,
        _timeout: Duration,
    ) -> Result<Arc<dyn PeerChannel>, TransportError> {
        tracing::debug!(device = %device.name, "peer session refused: no signaling path");
        Err(TransportError::SignalingUnavailable)
    }
}

/// Peer transport with a per-device session cache
pub struct PeerTransport {
    connector: Arc<dyn PeerConnector>,
    sessions: Mutex<HashMap<String, Arc<dyn PeerChannel>>>,
    connect_timeout: Duration,
    ack_timeout: Duration,
}

impl PeerTransport {
    /// Create the transport over a connector
    #[must_use]
    pub fn new(
        connector: Arc<dyn PeerConnector>,
        connect_timeout: Duration,
        ack_timeout: Duration,
    ) -> Self {
        Self {
            connector,
            sessions: Mutex::new(HashMap::new()),
            connect_timeout,
            ack_timeout,
        }
    }

    /// Cached session for a device, establishing one if needed
    ///
    /// The cache lock is not held across establishment, so dispatches to
    /// other devices and `disconnect`/`shutdown` never stall behind a slow
    /// connect. Two racing dispatches to the same device may both connect;
    /// the loser's channel is closed and the cached one wins.
    async fn session_for(&self, device: &Device) -> Result<Arc<dyn PeerChannel>, TransportError> {
        if let Some(channel) = self.sessions.lock().await.get(&device.id) {
            return Ok(Arc::clone(channel));
        }

        let channel = tokio::time::timeout(
            self.connect_timeout,
            self.connector.connect(device, self.connect_timeout),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.connect_timeout))??;

        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(&device.id) {
            let existing = Arc::clone(existing);
            drop(sessions);
            channel.close().await;
            return Ok(existing);
        }
        sessions.insert(device.id.clone(), Arc::clone(&channel));
        tracing::info!(device = %device.name, "peer session established");
        Ok(channel)
    }

    /// Tear down the cached session for one device, if any
    pub async fn disconnect(&self, device_id: &str) {
        let channel = self.sessions.lock().await.remove(device_id);
        if let Some(channel) = channel {
            channel.close().await;
            tracing::debug!(device_id, "peer session closed");
        }
    }

    /// Tear down every cached session
    pub async fn shutdown(&self) {
        let channels: Vec<_> = self.sessions.lock().await.drain().collect();
        for (device_id, channel) in channels {
            channel.close().await;
            tracing::debug!(device_id, "peer session closed");
        }
    }

    /// Number of live cached sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[async_trait]
impl Transport for PeerTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Webrtc
    }

    async fn probe(&self, device: &Device) -> bool {
        self.session_for(device).await.is_ok()
    }

    async fn send(&self, envelope: Envelope<'_>) -> Result<Delivery, TransportError> {
        let channel = self.session_for(envelope.device).await?;
        let payload = serde_json::json!({
            "command": envelope.command.name(),
            "value": envelope.command.value(),
        });

        let result = channel.request(payload, self.ack_timeout).await;
        if let Err(TransportError::Peer(_)) = &result {
            // A broken channel is not worth keeping; the next dispatch
            // re-establishes a fresh session.
            self.sessions.lock().await.remove(&envelope.device.id);
        }
        result?.into_delivery()
    }
}
