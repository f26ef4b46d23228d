//! Configuration for the TVLink gateway
//!
//! Loaded from a TOML file under the XDG config dir, then overridden by
//! `TVLINK_*` environment variables. Everything has a sensible default; a
//! missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::device::{Brand, Device, DeviceRegistry};
use crate::{Error, Result};

/// Gateway configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Port the control API listens on
    pub api_port: u16,

    /// Per-attempt transport timeout, seconds
    pub attempt_timeout_secs: u64,

    /// Timeout for each startup/connectivity probe, milliseconds
    pub probe_timeout_ms: u64,

    /// Candidate localhost ports probed for a proxy server's `/health`
    pub proxy_ports: Vec<u16>,

    /// Base URL of the browser-extension bridge
    pub extension_url: String,

    /// Peer session establishment timeout, seconds
    pub peer_connect_timeout_secs: u64,

    /// Peer acknowledgement timeout, seconds
    pub peer_ack_timeout_secs: u64,

    /// mDNS scan window, seconds
    pub scan_window_secs: u64,

    /// Statically seeded devices
    pub devices: Vec<DeviceSeed>,
}

/// One statically configured device
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSeed {
    /// Display name
    pub name: String,
    /// Brand
    pub brand: Brand,
    /// Network address (IP or hostname)
    pub addr: String,
    /// Model string, if known
    #[serde(default)]
    pub model: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 8787,
            attempt_timeout_secs: 8,
            probe_timeout_ms: 700,
            proxy_ports: vec![8765, 3001, 8080],
            extension_url: "http://127.0.0.1:8756".to_string(),
            peer_connect_timeout_secs: 5,
            peer_ack_timeout_secs: 5,
            scan_window_secs: 3,
            devices: Vec::new(),
        }
    }
}

impl Config {
    /// Default config file path (`~/.config/tvlink/tvlink.toml` on Linux)
    #[must_use]
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "tvlink", "tvlink").map_or_else(
            || PathBuf::from("tvlink.toml"),
            |dirs| dirs.config_dir().join("tvlink.toml"),
        )
    }

    /// Load configuration
    ///
    /// Reads `path` (or the default location) if it exists, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed,
    /// or when an environment override is malformed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            let config: Self = toml::from_str(&raw)?;
            tracing::debug!(path = %path.display(), "loaded configuration file");
            config
        } else {
            tracing::debug!(path = %path.display(), "no configuration file; using defaults");
            Self::default()
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `TVLINK_*` environment overrides
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("TVLINK_API_PORT") {
            self.api_port = parse_env("TVLINK_API_PORT", &port)?;
        }
        if let Ok(secs) = std::env::var("TVLINK_ATTEMPT_TIMEOUT_SECS") {
            self.attempt_timeout_secs = parse_env("TVLINK_ATTEMPT_TIMEOUT_SECS", &secs)?;
        }
        if let Ok(ports) = std::env::var("TVLINK_PROXY_PORTS") {
            self.proxy_ports = ports
                .split(',')
                .map(|p| parse_env("TVLINK_PROXY_PORTS", p.trim()))
                .collect::<Result<_>>()?;
        }
        if let Ok(url) = std::env::var("TVLINK_EXTENSION_URL") {
            self.extension_url = url;
        }
        Ok(())
    }

    /// Per-attempt transport timeout
    #[must_use]
    pub const fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Startup/connectivity probe timeout
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Peer session establishment timeout
    #[must_use]
    pub const fn peer_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_connect_timeout_secs)
    }

    /// Peer acknowledgement timeout
    #[must_use]
    pub const fn peer_ack_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_ack_timeout_secs)
    }

    /// mDNS scan window
    #[must_use]
    pub const fn scan_window(&self) -> Duration {
        Duration::from_secs(self.scan_window_secs)
    }

    /// Build a registry from the seeded device list
    #[must_use]
    pub fn seed_registry(&self) -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        for seed in &self.devices {
            let mut device = Device::new(seed.name.clone(), seed.brand, seed.addr.clone());
            device.model = seed.model.clone();
            registry.upsert(device);
        }
        registry
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Config(format!("invalid value for {name}: {raw}")))
}
