//! Brand-specific command translation
//!
//! Translation is pure and synchronous: a [`CommandTranslator`] maps a
//! logical [`Command`] to one [`WireRequest`] (method + URL + optional JSON
//! body) for its brand, or fails with a [`TranslateError`]. No network I/O
//! happens here.
//!
//! Brands with a closed command map (Roku, Samsung) reject anything outside
//! the map; LG is intentionally permissive and uppercases unknown names;
//! Sony and the remaining brands embed the command verbatim in a generic
//! endpoint body.

mod generic;
mod lg;
mod profile;
mod roku;
mod samsung;

use serde::Serialize;
use thiserror::Error;

pub use generic::GenericTranslator;
pub use lg::LgTranslator;
pub use profile::{WireProfile, endpoint, profile};
pub use roku::RokuTranslator;
pub use samsung::SamsungTranslator;

use crate::command::Command;
use crate::device::{Brand, Device};

/// HTTP method of a translated request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WireMethod {
    /// GET request
    Get,
    /// POST request
    Post,
}

/// A brand-specific wire request, ready for a transport to deliver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WireRequest {
    /// HTTP method
    pub method: WireMethod,
    /// Full target URL, including the brand's port and path convention
    pub url: String,
    /// JSON body, if the brand's convention carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl WireRequest {
    /// A bodyless POST, the common keypress shape
    #[must_use]
    pub const fn post(url: String) -> Self {
        Self {
            method: WireMethod::Post,
            url,
            body: None,
        }
    }

    /// A POST carrying a JSON body
    #[must_use]
    pub const fn post_json(url: String, body: serde_json::Value) -> Self {
        Self {
            method: WireMethod::Post,
            url,
            body: Some(body),
        }
    }
}

/// Why a command could not be translated for a brand
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The brand's command map has no entry for this command
    #[error("{brand} does not support the {command} command")]
    UnsupportedCommand {
        /// Brand whose map was consulted
        brand: Brand,
        /// Logical command name
        command: String,
    },

    /// The app name is not in the brand's app table
    #[error("{app} is not available on {brand}")]
    UnknownApp {
        /// Brand whose app table was consulted
        brand: Brand,
        /// Human-readable app name as given
        app: String,
    },
}

/// Pure per-brand translation from logical command to wire request
pub trait CommandTranslator: Send + Sync {
    /// Brand this translator handles
    fn brand(&self) -> Brand;

    /// Translate a logical command for a device of this brand
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError`] when the brand cannot express the command;
    /// the dispatcher surfaces this without attempting any transport.
    fn translate(&self, device: &Device, command: &Command) -> Result<WireRequest, TranslateError>;
}

/// Translator for a brand
///
/// Every [`Brand`] has a translator; permissive brands route through the
/// generic one, so an "unsupported brand" cannot occur past this point.
#[must_use]
pub fn translator_for(brand: Brand) -> &'static dyn CommandTranslator {
    static ROKU: RokuTranslator = RokuTranslator;
    static SAMSUNG: SamsungTranslator = SamsungTranslator;
    static LG: LgTranslator = LgTranslator;
    static SONY: GenericTranslator = GenericTranslator::new(Brand::Sony);
    static APPLE: GenericTranslator = GenericTranslator::new(Brand::Apple);
    static OTHER: GenericTranslator = GenericTranslator::new(Brand::Other);

    match brand {
        Brand::Roku => &ROKU,
        Brand::Samsung => &SAMSUNG,
        Brand::Lg => &LG,
        Brand::Sony => &SONY,
        Brand::Apple => &APPLE,
        Brand::Other => &OTHER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_brand_has_a_translator() {
        for brand in [
            Brand::Roku,
            Brand::Samsung,
            Brand::Lg,
            Brand::Sony,
            Brand::Apple,
            Brand::Other,
        ] {
            assert_eq!(translator_for(brand).brand(), brand);
        }
    }
}
