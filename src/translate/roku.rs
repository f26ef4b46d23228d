//! Roku External Control Protocol translation
//!
//! Keypresses go to `POST :8060/keypress/{Key}`, app launches to
//! `POST :8060/launch/{channel_id}`. Both tables are closed: a command or
//! app name outside them is a hard translation error, never a fall-through
//! to a generic endpoint.

use super::{CommandTranslator, TranslateError, WireRequest, endpoint, profile};
use crate::command::Command;
use crate::device::{Brand, Device};

/// Logical command -> ECP keypress name
const KEY_MAP: &[(&str, &str)] = &[
    ("up", "Up"),
    ("down", "Down"),
    ("left", "Left"),
    ("right", "Right"),
    ("ok", "Select"),
    ("back", "Back"),
    ("home", "Home"),
    ("play_pause", "Play"),
    ("rewind", "Rev"),
    ("fast_forward", "Fwd"),
    ("volume_up", "VolumeUp"),
    ("volume_down", "VolumeDown"),
    ("mute", "VolumeMute"),
    ("power", "Power"),
];

/// Human app name (lowercased) -> Roku channel id
const CHANNEL_MAP: &[(&str, &str)] = &[
    ("netflix", "12"),
    ("youtube", "837"),
    ("hulu", "2285"),
    ("disney plus", "291097"),
    ("disney+", "291097"),
    ("prime video", "13"),
    ("amazon prime video", "13"),
    ("max", "61322"),
    ("hbo max", "61322"),
    ("apple tv", "551012"),
    ("apple tv+", "551012"),
    ("spotify", "22297"),
    ("paramount plus", "31440"),
    ("paramount+", "31440"),
    ("peacock", "593099"),
];

/// Translator for Roku devices
pub struct RokuTranslator;

impl RokuTranslator {
    fn key_for(command: &Command) -> Option<&'static str> {
        let name = command.name();
        KEY_MAP
            .iter()
            .find(|(logical, _)| *logical == name)
            .map(|(_, key)| *key)
    }

    fn channel_id(app: &str) -> Option<&'static str> {
        let lower = app.trim().to_lowercase();
        CHANNEL_MAP
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, id)| *id)
    }
}

impl CommandTranslator for RokuTranslator {
    fn brand(&self) -> Brand {
        Brand::Roku
    }

    fn translate(&self, device: &Device, command: &Command) -> Result<WireRequest, TranslateError> {
        let wire = profile(Brand::Roku);

        if let Command::LaunchApp(app) = command {
            let id = Self::channel_id(app).ok_or_else(|| TranslateError::UnknownApp {
                brand: Brand::Roku,
                app: app.clone(),
            })?;
            let path = format!("{}/{id}", wire.launch_path.unwrap_or_default());
            return Ok(WireRequest::post(endpoint(device, wire.port, &path)));
        }

        let key = Self::key_for(command).ok_or_else(|| TranslateError::UnsupportedCommand {
            brand: Brand::Roku,
            command: command.name().to_string(),
        })?;
        let path = format!("{}/{key}", wire.keypress_path.unwrap_or_default());
        Ok(WireRequest::post(endpoint(device, wire.port, &path)))
    }
}
