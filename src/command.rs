//! Logical remote commands
//!
//! A [`Command`] is an abstract user intent, independent of TV brand. The
//! vocabulary is fixed: navigation, media, volume, power, app launch,
//! touchpad gestures, and keyboard text. Names outside the vocabulary are
//! carried as [`Command::Other`]; brands with a closed command map reject
//! them at translation time, permissive brands pass them through verbatim.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An abstract remote-control action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum Command {
    /// Navigate up
    Up,
    /// Navigate down
    Down,
    /// Navigate left
    Left,
    /// Navigate right
    Right,
    /// Confirm / select
    Ok,
    /// Go back
    Back,
    /// Go to the home screen
    Home,
    /// Toggle play/pause
    PlayPause,
    /// Rewind
    Rewind,
    /// Fast forward
    FastForward,
    /// Volume up one step
    VolumeUp,
    /// Volume down one step
    VolumeDown,
    /// Toggle mute
    Mute,
    /// Toggle power
    Power,
    /// Launch an app by human-readable name (e.g. "Netflix")
    LaunchApp(String),
    /// Type text on the on-screen keyboard
    Text(String),
    /// Touchpad tap at normalized coordinates (0.0..=1.0)
    Tap {
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
    /// Touchpad swipe by a normalized delta
    Swipe {
        /// Horizontal delta
        dx: f64,
        /// Vertical delta
        dy: f64,
    },
    /// A command outside the fixed vocabulary, carried verbatim
    Other(String),
}

impl Command {
    /// Logical name of the command (the vocabulary spelling)
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
            Self::Ok => "ok",
            Self::Back => "back",
            Self::Home => "home",
            Self::PlayPause => "play_pause",
            Self::Rewind => "rewind",
            Self::FastForward => "fast_forward",
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::Mute => "mute",
            Self::Power => "power",
            Self::LaunchApp(_) => "launch_app",
            Self::Text(_) => "text",
            Self::Tap { .. } => "tap",
            Self::Swipe { .. } => "swipe",
            Self::Other(name) => name,
        }
    }

    /// Payload value carried by the command, if any, in wire form
    #[must_use]
    pub fn value(&self) -> Option<serde_json::Value> {
        match self {
            Self::LaunchApp(app) => Some(serde_json::Value::String(app.clone())),
            Self::Text(text) => Some(serde_json::Value::String(text.clone())),
            Self::Tap { x, y } => Some(serde_json::json!({ "x": x, "y": y })),
            Self::Swipe { dx, dy } => Some(serde_json::json!({ "dx": dx, "dy": dy })),
            _ => None,
        }
    }

    /// Build a command from a name plus an optional value string
    ///
    /// This is the boundary form used by the CLI and the control API.
    /// `tap`/`swipe` values are `x,y` pairs. Unrecognized names become
    /// [`Command::Other`]; whether that is an error is the translator's call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] when a required value is missing or
    /// malformed for commands that carry one.
    pub fn parse(name: &str, value: Option<&str>) -> Result<Self> {
        let command = match name {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "ok" | "select" => Self::Ok,
            "back" => Self::Back,
            "home" => Self::Home,
            "play_pause" => Self::PlayPause,
            "rewind" => Self::Rewind,
            "fast_forward" => Self::FastForward,
            "volume_up" => Self::VolumeUp,
            "volume_down" => Self::VolumeDown,
            "mute" => Self::Mute,
            "power" => Self::Power,
            "launch_app" => Self::LaunchApp(required(name, value)?.to_string()),
            "text" => Self::Text(required(name, value)?.to_string()),
            "tap" => {
                let (x, y) = pair(name, value)?;
                Self::Tap { x, y }
            }
            "swipe" => {
                let (dx, dy) = pair(name, value)?;
                Self::Swipe { dx, dy }
            }
            other => Self::Other(other.to_string()),
        };
        Ok(command)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidCommand(format!("{name} requires a value")))
}

fn pair(name: &str, value: Option<&str>) -> Result<(f64, f64)> {
    let raw = required(name, value)?;
    let (a, b) = raw
        .split_once(',')
        .ok_or_else(|| Error::InvalidCommand(format!("{name} value must be \"x,y\"")))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidCommand(format!("{name} value must be numeric")))
    };
    Ok((parse(a)?, parse(b)?))
}
