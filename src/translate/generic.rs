//! Generic translation for brands without a dedicated dialect
//!
//! Sony, Apple, and unknown sets share a single endpoint pattern; the
//! logical command is not translated, only embedded verbatim.

use super::{CommandTranslator, TranslateError, WireRequest, endpoint, profile};
use crate::command::Command;
use crate::device::{Brand, Device};

/// Pass-through translator used by every brand without its own command map
pub struct GenericTranslator {
    brand: Brand,
}

impl GenericTranslator {
    /// Create a generic translator for a brand
    #[must_use]
    pub const fn new(brand: Brand) -> Self {
        Self { brand }
    }
}

impl CommandTranslator for GenericTranslator {
    fn brand(&self) -> Brand {
        self.brand
    }

    fn translate(&self, device: &Device, command: &Command) -> Result<WireRequest, TranslateError> {
        let wire = profile(self.brand);
        let body = serde_json::json!({
            "command": command.name(),
            "value": command.value(),
        });
        Ok(WireRequest::post_json(
            endpoint(device, wire.port, wire.command_path.unwrap_or_default()),
            body,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_embedded_verbatim() {
        let device = Device::new("Studio", Brand::Sony, "192.168.1.80");
        let request = GenericTranslator::new(Brand::Sony)
            .translate(&device, &Command::Other("mystery_key".to_string()))
            .unwrap();
        assert_eq!(request.url, "http://192.168.1.80:80/api/command");
        assert_eq!(request.body.unwrap()["command"], "mystery_key");
    }
}
