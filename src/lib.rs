//! TVLink Gateway - Command dispatch for smart TVs
//!
//! This library provides the core functionality for the TVLink gateway:
//! - Brand-aware command translation (Roku, Samsung, LG, Sony, generic)
//! - Layered transport strategies with automatic fallback
//! - Error classification with actionable troubleshooting guidance
//! - mDNS device discovery and a local HTTP control API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    Clients                          │
//! │   Web remote  │  CLI  │  Shortcuts  │  Scripts      │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                TVLink Gateway                       │
//! │   Session  │  Dispatcher  │  Translator  │  Scan    │
//! └────────────────────┬────────────────────────────────┘
//!                      │ peer → proxy → extension → direct
//! ┌────────────────────▼────────────────────────────────┐
//! │                  Televisions                        │
//! │   Roku ECP  │  Samsung  │  LG  │  Sony  │  ...      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod device;
pub mod diagnose;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod repeat;
pub mod session;
pub mod translate;
pub mod transport;

pub use command::Command;
pub use config::Config;
pub use device::{Brand, Device, DeviceRegistry};
pub use diagnose::{CommandOutcome, DeliveryMethod, ErrorKind};
pub use discovery::MdnsScanner;
pub use dispatch::Dispatcher;
pub use error::{Error, Result};
pub use repeat::{KeyRepeat, REPEAT_INTERVAL};
pub use session::{ConnectionStatus, Session, SessionReply};
pub use translate::{CommandTranslator, TranslateError, WireMethod, WireRequest, translator_for};
pub use transport::{
    Attempt, Delivery, DirectTransport, Envelope, ExtensionTransport, NoSignalingConnector,
    PeerChannel, PeerConnector, PeerTransport, ProxyTransport, Transport, TransportError,
    TransportKind,
};
