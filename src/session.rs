//! Session state for remote-control clients
//!
//! Owns what the dispatcher deliberately does not: the device registry and
//! selection, the connection-status tri-state, the last outcome, and the
//! duplicate-error-dialog suppression. Every dispatch goes through here so
//! those pieces stay consistent: status flips to `connecting` for the
//! duration of the dispatch, then to `connected` or `disconnected` from the
//! result, and the target device's registry entry gets its connectivity
//! outcome recorded.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::command::Command;
use crate::device::{Device, DeviceRegistry};
use crate::diagnose::CommandOutcome;
use crate::dispatch::Dispatcher;
use crate::{Error, Result};

/// Connection status as presented to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Last dispatch succeeded
    Connected,
    /// A dispatch is in flight
    Connecting,
    /// No successful dispatch yet, or the last one failed
    Disconnected,
}

/// A dispatch outcome plus the presentation hints clients need
#[derive(Debug, Clone, Serialize)]
pub struct SessionReply {
    /// The dispatch outcome
    #[serde(flatten)]
    pub outcome: CommandOutcome,

    /// Connection status after this dispatch
    pub status: ConnectionStatus,

    /// Whether a failure dialog should be shown; stays `false` while one is
    /// already open for the same device
    pub present_error: bool,
}

/// Shared session state for one gateway process
pub struct Session {
    dispatcher: Arc<Dispatcher>,
    registry: RwLock<DeviceRegistry>,
    status: RwLock<ConnectionStatus>,
    last_outcome: RwLock<Option<CommandOutcome>>,
    /// Device id with an error dialog currently presented, if any
    error_presented_for: RwLock<Option<String>>,
}

impl Session {
    /// Create a session over a dispatcher and an initial registry
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>, registry: DeviceRegistry) -> Self {
        Self {
            dispatcher,
            registry: RwLock::new(registry),
            status: RwLock::new(ConnectionStatus::Disconnected),
            last_outcome: RwLock::new(None),
            error_presented_for: RwLock::new(None),
        }
    }

    /// The dispatcher behind this session
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Snapshot of the known devices
    pub async fn devices(&self) -> Vec<Device> {
        self.registry.read().await.devices().to_vec()
    }

    /// Currently selected device, if any
    pub async fn selected(&self) -> Option<Device> {
        self.registry.read().await.selected().cloned()
    }

    /// Add or merge a device
    pub async fn upsert_device(&self, device: Device) {
        self.registry.write().await.upsert(device);
    }

    /// Select a device by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] for an unknown id.
    pub async fn select_device(&self, id: &str) -> Result<Device> {
        let mut registry = self.registry.write().await;
        let device = registry.select(id)?.clone();
        tracing::info!(device = %device.name, "device selected");
        Ok(device)
    }

    /// Find a device by id or name
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] when nothing matches.
    pub async fn find_device(&self, key: &str) -> Result<Device> {
        self.registry
            .read()
            .await
            .find(key)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(key.to_string()))
    }

    /// Current connection status
    pub async fn status(&self) -> ConnectionStatus {
        *self.status.read().await
    }

    /// Outcome of the most recent dispatch
    pub async fn last_outcome(&self) -> Option<CommandOutcome> {
        self.last_outcome.read().await.clone()
    }

    /// Dispatch a command to the selected device
    pub async fn send(&self, command: &Command) -> SessionReply {
        let device = self.selected().await;
        self.send_to(device, command).await
    }

    /// Dispatch a command to an explicit device (or none)
    pub async fn send_to(&self, device: Option<Device>, command: &Command) -> SessionReply {
        *self.status.write().await = ConnectionStatus::Connecting;

        let outcome = self
            .dispatcher
            .send_command(device.as_ref(), command)
            .await;

        let status = if outcome.success {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        };
        *self.status.write().await = status;

        if let Some(device) = &device {
            self.registry
                .write()
                .await
                .record_seen(&device.id, outcome.success);
        }

        let present_error = self.update_error_presentation(device.as_ref(), outcome.success).await;
        *self.last_outcome.write().await = Some(outcome.clone());

        SessionReply {
            outcome,
            status,
            present_error,
        }
    }

    /// Tear down transport state for a device
    pub async fn disconnect(&self, device_id: &str) {
        self.dispatcher.disconnect(device_id).await;
        self.registry.write().await.record_seen(device_id, false);
    }

    /// Acknowledge that the client dismissed the failure dialog
    pub async fn dismiss_error(&self) {
        *self.error_presented_for.write().await = None;
    }

    /// On success, clear stale error presentation; on failure, suppress the
    /// dialog if one is already open for this device.
    async fn update_error_presentation(
        &self,
        device: Option<&Device>,
        success: bool,
    ) -> bool {
        let mut presented = self.error_presented_for.write().await;
        if success {
            *presented = None;
            return false;
        }
        let device_id = device.map(|d| d.id.clone());
        if *presented == device_id && presented.is_some() {
            // Same device's dialog is still open; don't stack another.
            return false;
        }
        *presented = device_id;
        true
    }
}
