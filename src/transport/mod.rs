//! Transport strategies
//!
//! Each strategy is one concrete way to deliver a translated command to a
//! physical device, with two independent operations: `probe` (connectivity
//! test) and `send`. The asymmetry matters and is part of the contract: a
//! device can answer a probe on a strategy and still fail to execute a
//! command over that same strategy, so probe success is never a guarantee
//! of command success.
//!
//! Strategies in dispatch order:
//! - [`PeerTransport`] — WebRTC-style data channel with a per-device
//!   session cache; needs a signaling path to establish.
//! - [`ProxyTransport`] — local relay server detected once at startup.
//! - [`ExtensionTransport`] — browser-extension bridge detected once at
//!   startup.
//! - [`DirectTransport`] — plain HTTP to the set; last resort because the
//!   exchange completing says little about the command being acted on.

mod direct;
mod extension;
mod peer;
mod proxy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use direct::DirectTransport;
pub use extension::ExtensionTransport;
pub use peer::{NoSignalingConnector, PeerChannel, PeerConnector, PeerTransport};
pub use proxy::ProxyTransport;

use crate::command::Command;
use crate::device::Device;
use crate::translate::WireRequest;

/// Identifier of a transport strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Peer data channel
    Webrtc,
    /// Local proxy relay
    Proxy,
    /// Browser-extension bridge
    Extension,
    /// Plain HTTP to the device
    Direct,
}

impl TransportKind {
    /// Lowercase wire name, as surfaced in command results
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Webrtc => "webrtc",
            Self::Proxy => "proxy",
            Self::Extension => "extension",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed delivery, in classifiable form
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The attempt did not complete within its deadline
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The request could not reach the target at all
    #[error("network error: {0}")]
    Network(String),

    /// A bridge reported the browser blocked the request cross-origin
    #[error("cross-origin request blocked: {0}")]
    CrossOrigin(String),

    /// The target answered with a non-success HTTP status
    #[error("device returned HTTP {0}")]
    Status(u16),

    /// No local proxy server answered its health probe
    #[error("no proxy server responded")]
    ProxyUnavailable,

    /// No extension bridge answered its health probe
    #[error("extension bridge not detected")]
    ExtensionUnavailable,

    /// No signaling path exists to establish a peer session
    #[error("signaling unavailable: no pairing channel configured for this device")]
    SignalingUnavailable,

    /// Peer session establishment or the data channel itself failed
    #[error("peer connection failed: {0}")]
    Peer(String),

    /// The relaying side delivered the command and the device (or bridge)
    /// reported failure
    #[error("command rejected: {0}")]
    Rejected(String),
}

impl TransportError {
    /// Map a `reqwest` failure to its transport category
    #[must_use]
    pub fn from_http(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(std::time::Duration::from_secs(0))
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Outcome of a successful delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Whether the device (or a relaying bridge that can read real
    /// responses) acknowledged the command, as opposed to the exchange
    /// merely completing
    pub confirmed: bool,
}

impl Delivery {
    /// An acknowledged delivery
    #[must_use]
    pub const fn confirmed() -> Self {
        Self { confirmed: true }
    }

    /// A best-effort delivery with no acknowledgement
    #[must_use]
    pub const fn unconfirmed() -> Self {
        Self { confirmed: false }
    }
}

/// Everything a strategy may need to deliver one command
///
/// Relaying strategies (proxy, peer) forward the logical command and let the
/// far side translate; device-facing strategies (direct, extension) use the
/// brand-translated wire request.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    /// Target device
    pub device: &'a Device,
    /// Logical command as issued
    pub command: &'a Command,
    /// Brand-translated wire request
    pub wire: &'a WireRequest,
}

/// One concrete delivery mechanism
#[async_trait]
pub trait Transport: Send + Sync {
    /// Which strategy this is
    fn kind(&self) -> TransportKind;

    /// Whether startup detection left this strategy usable
    ///
    /// Strategies that probe for a helper once per session (proxy,
    /// extension) report `false` here after a failed detection and are
    /// skipped by the dispatcher without a send attempt.
    fn ready(&self) -> bool {
        true
    }

    /// Connectivity test against a device
    ///
    /// Independent of [`Transport::send`]; success here does not guarantee a
    /// command will execute.
    async fn probe(&self, device: &Device) -> bool;

    /// Deliver one command
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] describing the failure; the dispatcher
    /// records it and tries the next strategy.
    async fn send(&self, envelope: Envelope<'_>) -> Result<Delivery, TransportError>;
}

/// Record of one failed attempt, kept for the classifier
#[derive(Debug, Clone)]
pub struct Attempt {
    /// Strategy that was tried
    pub kind: TransportKind,
    /// How it failed
    pub error: TransportError,
}

/// Acknowledgement shape shared by the relaying strategies
#[derive(Debug, Deserialize)]
pub struct RelayAck {
    /// Whether the far side reports the command executed
    pub success: bool,
    /// Failure detail when `success` is false
    #[serde(default)]
    pub error: Option<String>,
}

impl RelayAck {
    /// Convert a relay acknowledgement into a delivery or an error
    ///
    /// Bridge-reported failures are sniffed for a cross-origin signature so
    /// the classifier can tell a browser block from a device rejection.
    pub(crate) fn into_delivery(self) -> Result<Delivery, TransportError> {
        if self.success {
            return Ok(Delivery::confirmed());
        }
        let message = self.error.unwrap_or_else(|| "unspecified failure".to_string());
        let lower = message.to_lowercase();
        if lower.contains("cors") || lower.contains("cross-origin") {
            Err(TransportError::CrossOrigin(message))
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Err(TransportError::Timeout(std::time::Duration::from_secs(0)))
        } else {
            Err(TransportError::Rejected(message))
        }
    }
}
