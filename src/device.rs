//! Devices and the in-session device registry
//!
//! A [`Device`] is one controllable TV. The brand decides which command
//! translator applies and which wire conventions are used. The registry owns
//! the set of known devices plus the current selection; devices are updated
//! in place on probe/dispatch outcomes and never removed mid-session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// TV brand, the closed set of control dialects the gateway understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    /// Roku / Roku TV (External Control Protocol)
    Roku,
    /// Samsung Tizen sets
    Samsung,
    /// LG webOS sets
    Lg,
    /// Sony Bravia sets
    Sony,
    /// Apple TV
    Apple,
    /// Anything else; controlled via the generic endpoint
    Other,
}

impl Brand {
    /// Lowercase wire name of the brand
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roku => "roku",
            Self::Samsung => "samsung",
            Self::Lg => "lg",
            Self::Sony => "sony",
            Self::Apple => "apple",
            Self::Other => "other",
        }
    }

    /// Guess a brand from a free-form model/hostname string
    ///
    /// Used by discovery; defaults to [`Brand::Other`] when nothing matches.
    #[must_use]
    pub fn guess(hint: &str) -> Self {
        let lower = hint.to_lowercase();
        if lower.contains("roku") {
            Self::Roku
        } else if lower.contains("samsung") || lower.contains("tizen") {
            Self::Samsung
        } else if lower.contains("lg") || lower.contains("webos") {
            Self::Lg
        } else if lower.contains("sony") || lower.contains("bravia") {
            Self::Sony
        } else if lower.contains("apple") || lower.contains("airplay") {
            Self::Apple
        } else {
            Self::Other
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Brand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "roku" => Ok(Self::Roku),
            "samsung" => Ok(Self::Samsung),
            "lg" | "webos" => Ok(Self::Lg),
            "sony" | "bravia" => Ok(Self::Sony),
            "apple" | "appletv" => Ok(Self::Apple),
            "other" | "generic" => Ok(Self::Other),
            other => Err(Error::Config(format!("unknown brand: {other}"))),
        }
    }
}

/// A controllable TV on the local network
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Stable identifier, unique within the registry
    pub id: String,

    /// Display name
    pub name: String,

    /// Brand; decides translator and wire conventions
    pub brand: Brand,

    /// Model string, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Network address (IP or hostname, without port)
    pub addr: String,

    /// Whether the device answered its last probe or command
    #[serde(default)]
    pub online: bool,

    /// When the device was last seen answering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Device {
    /// Create a device with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, brand: Brand, addr: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            brand,
            model: None,
            addr: addr.into(),
            online: false,
            last_seen: None,
        }
    }

    /// Record a connectivity outcome, stamping `last_seen`
    pub fn record_seen(&mut self, online: bool) {
        self.online = online;
        self.last_seen = Some(Utc::now());
    }
}

/// In-session device registry: known devices plus the current selection
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Device>,
    selected: Option<String>,
}

impl DeviceRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All known devices
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Number of known devices
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Look up a device by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Look up a device by id or display name
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Device> {
        self.devices
            .iter()
            .find(|d| d.id == key || d.name.eq_ignore_ascii_case(key))
    }

    /// Insert a device, or merge it into an existing entry with the same id
    /// or the same address (discovery re-resolving a seeded set)
    pub fn upsert(&mut self, device: Device) {
        if let Some(existing) = self
            .devices
            .iter_mut()
            .find(|d| d.id == device.id || d.addr == device.addr)
        {
            existing.name = device.name;
            existing.brand = device.brand;
            existing.addr = device.addr;
            if device.model.is_some() {
                existing.model = device.model;
            }
            if device.last_seen.is_some() {
                existing.online = device.online;
                existing.last_seen = device.last_seen;
            }
        } else {
            self.devices.push(device);
        }
    }

    /// Select a device by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if no device has that id.
    pub fn select(&mut self, id: &str) -> Result<&Device> {
        let device = self
            .devices
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::DeviceNotFound(id.to_string()))?;
        self.selected = Some(device.id.clone());
        Ok(device)
    }

    /// Currently selected device, if any
    #[must_use]
    pub fn selected(&self) -> Option<&Device> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    /// Record a connectivity outcome for a device by id
    pub fn record_seen(&mut self, id: &str, online: bool) {
        if let Some(device) = self.devices.iter_mut().find(|d| d.id == id) {
            device.record_seen(online);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_guess_matches_common_hints() {
        assert_eq!(Brand::guess("Roku Ultra"), Brand::Roku);
        assert_eq!(Brand::guess("Samsung Tizen 7"), Brand::Samsung);
        assert_eq!(Brand::guess("LG webOS TV OLED55"), Brand::Lg);
        assert_eq!(Brand::guess("Sony BRAVIA XR"), Brand::Sony);
        assert_eq!(Brand::guess("projector-x1"), Brand::Other);
    }

    #[test]
    fn upsert_merges_by_address() {
        let mut registry = DeviceRegistry::new();
        registry.upsert(Device::new("Living Room", Brand::Roku, "192.168.1.20"));
        assert_eq!(registry.len(), 1);

        let mut rediscovered = Device::new("Living Room TV", Brand::Roku, "192.168.1.20");
        rediscovered.record_seen(true);
        registry.upsert(rediscovered);

        assert_eq!(registry.len(), 1);
        let device = &registry.devices()[0];
        assert_eq!(device.name, "Living Room TV");
        assert!(device.online);
    }

    #[test]
    fn select_unknown_id_fails() {
        let mut registry = DeviceRegistry::new();
        assert!(registry.select("missing").is_err());
        assert!(registry.selected().is_none());
    }

    #[test]
    fn record_seen_stamps_last_seen() {
        let mut registry = DeviceRegistry::new();
        let device = Device::new("Bedroom", Brand::Samsung, "192.168.1.30");
        let id = device.id.clone();
        registry.upsert(device);

        registry.record_seen(&id, true);
        let device = registry.get(&id).unwrap();
        assert!(device.online);
        assert!(device.last_seen.is_some());
    }
}
