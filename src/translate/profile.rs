//! Per-brand wire conventions
//!
//! Port and path conventions live in this table rather than in code branches
//! so adding a brand is a data change, and so the translators can be tested
//! against one source of truth.

use crate::device::{Brand, Device};

/// Wire conventions for one brand: control port plus endpoint path templates
#[derive(Debug, Clone, Copy)]
pub struct WireProfile {
    /// TCP port the control endpoint listens on
    pub port: u16,
    /// Path prefix for keypress-style commands, if the brand has one
    pub keypress_path: Option<&'static str>,
    /// Path prefix for app launch, if the brand has one
    pub launch_path: Option<&'static str>,
    /// Generic JSON command endpoint, if the brand has one
    pub command_path: Option<&'static str>,
}

/// Wire profile for a brand
#[must_use]
pub const fn profile(brand: Brand) -> WireProfile {
    match brand {
        Brand::Roku => WireProfile {
            port: 8060,
            keypress_path: Some("/keypress"),
            launch_path: Some("/launch"),
            command_path: None,
        },
        Brand::Samsung => WireProfile {
            port: 8001,
            keypress_path: Some("/api/v2/keys"),
            launch_path: None,
            command_path: None,
        },
        Brand::Lg => WireProfile {
            port: 3000,
            keypress_path: None,
            launch_path: None,
            command_path: Some("/api/command"),
        },
        Brand::Sony | Brand::Apple | Brand::Other => WireProfile {
            port: 80,
            keypress_path: None,
            launch_path: None,
            command_path: Some("/api/command"),
        },
    }
}

/// Build a full URL for a device endpoint path
#[must_use]
pub fn endpoint(device: &Device, port: u16, path: &str) -> String {
    format!("http://{}:{}{}", device.addr, port, path)
}
