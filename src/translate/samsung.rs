//! Samsung Tizen key translation
//!
//! Keys go to `POST :8001/api/v2/keys/{KEY}` with a JSON body naming the
//! key. The map is closed; app launch and anything outside the map is a
//! translation error (the Tizen app API needs a pairing flow this layer
//! does not own).

use super::{CommandTranslator, TranslateError, WireRequest, endpoint, profile};
use crate::command::Command;
use crate::device::{Brand, Device};

/// Logical command -> Samsung key constant
const KEY_MAP: &[(&str, &str)] = &[
    ("up", "KEY_UP"),
    ("down", "KEY_DOWN"),
    ("left", "KEY_LEFT"),
    ("right", "KEY_RIGHT"),
    ("ok", "KEY_ENTER"),
    ("back", "KEY_RETURN"),
    ("home", "KEY_HOME"),
    ("play_pause", "KEY_PLAY"),
    ("rewind", "KEY_REWIND"),
    ("fast_forward", "KEY_FF"),
    ("volume_up", "KEY_VOLUP"),
    ("volume_down", "KEY_VOLDOWN"),
    ("mute", "KEY_MUTE"),
    ("power", "KEY_POWER"),
];

/// Translator for Samsung devices
pub struct SamsungTranslator;

impl SamsungTranslator {
    fn key_for(command: &Command) -> Option<&'static str> {
        let name = command.name();
        KEY_MAP
            .iter()
            .find(|(logical, _)| *logical == name)
            .map(|(_, key)| *key)
    }
}

impl CommandTranslator for SamsungTranslator {
    fn brand(&self) -> Brand {
        Brand::Samsung
    }

    fn translate(&self, device: &Device, command: &Command) -> Result<WireRequest, TranslateError> {
        let key = Self::key_for(command).ok_or_else(|| TranslateError::UnsupportedCommand {
            brand: Brand::Samsung,
            command: command.name().to_string(),
        })?;

        let wire = profile(Brand::Samsung);
        let path = format!("{}/{key}", wire.keypress_path.unwrap_or_default());
        Ok(WireRequest::post_json(
            endpoint(device, wire.port, &path),
            serde_json::json!({ "key": key }),
        ))
    }
}
