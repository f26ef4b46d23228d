//! LG webOS translation (best effort)
//!
//! Commands go to `POST :3000/api/command` as `{command, value}`. The true
//! webOS control channel is a WebSocket pairing flow that is out of this
//! layer's reach, so the map here is deliberately permissive: anything not
//! in it is uppercased and sent through rather than rejected.

use super::{CommandTranslator, TranslateError, WireRequest, endpoint, profile};
use crate::command::Command;
use crate::device::{Brand, Device};

/// Logical command -> webOS token, for the names that differ from a plain
/// uppercasing
const KEY_MAP: &[(&str, &str)] = &[
    ("ok", "ENTER"),
    ("play_pause", "PLAY"),
    ("rewind", "REWIND"),
    ("fast_forward", "FASTFORWARD"),
    ("volume_up", "VOLUMEUP"),
    ("volume_down", "VOLUMEDOWN"),
];

/// Translator for LG devices
pub struct LgTranslator;

impl LgTranslator {
    fn token_for(command: &Command) -> String {
        let name = command.name();
        KEY_MAP
            .iter()
            .find(|(logical, _)| *logical == name)
            .map_or_else(|| name.to_uppercase(), |(_, token)| (*token).to_string())
    }
}

impl CommandTranslator for LgTranslator {
    fn brand(&self) -> Brand {
        Brand::Lg
    }

    fn translate(&self, device: &Device, command: &Command) -> Result<WireRequest, TranslateError> {
        let wire = profile(Brand::Lg);
        let body = serde_json::json!({
            "command": Self::token_for(command),
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

    fn device() -> Device {
        Device::new("Loft", Brand::Lg, "192.168.1.70")
    }

    #[test]
    fn mapped_names_use_the_webos_token() {
        let request = LgTranslator.translate(&device(), &Command::Ok).unwrap();
        assert_eq!(request.url, "http://192.168.1.70:3000/api/command");
        assert_eq!(request.body.unwrap()["command"], "ENTER");
    }

    #[test]
    fn unmapped_names_fall_back_to_uppercase() {
        let request = LgTranslator
            .translate(&device(), &Command::Other("xyz_unmapped".to_string()))
            .unwrap();
        assert_eq!(request.body.unwrap()["command"], "XYZ_UNMAPPED");
    }

    #[test]
    fn payload_rides_in_the_value_field() {
        let request = LgTranslator
            .translate(&device(), &Command::LaunchApp("Netflix".to_string()))
            .unwrap();
        let body = request.body.unwrap();
        assert_eq!(body["command"], "LAUNCH_APP");
        assert_eq!(body["value"], "Netflix");
    }
}
