//! Failure classification and troubleshooting guidance
//!
//! When every strategy has failed, the collected [`Attempt`]s are reduced to
//! one structured [`CommandOutcome`]: a single error kind, a message, and an
//! ordered troubleshooting list the UI can render. Classification is
//! deterministic: the most diagnostically specific signal across all
//! attempts wins, and on a tie the attempt from the earlier strategy in
//! dispatch order is preferred.
//!
//! Specificity, most specific first:
//! `not_found` > `unauthorized` > `network` > `cors` > `timeout` >
//! `webrtc_failed` > `proxy_unavailable` > `unknown`.
//!
//! Brand guidance is appended to the generic steps, never substituted.

use serde::Serialize;

use crate::device::Brand;
use crate::transport::{Attempt, TransportError, TransportKind};

/// Category of a classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Browser blocked the request cross-origin
    Cors,
    /// Attempt expired before completing
    Timeout,
    /// Generic network failure
    Network,
    /// Device answered 401/403
    Unauthorized,
    /// Device answered 404
    NotFound,
    /// No local proxy server responded
    ProxyUnavailable,
    /// Peer session could not be established or broke
    WebrtcFailed,
    /// Nothing more specific could be determined
    Unknown,
}

impl ErrorKind {
    /// Snake-case wire name of the kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cors => "cors",
            Self::Timeout => "timeout",
            Self::Network => "network",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::ProxyUnavailable => "proxy_unavailable",
            Self::WebrtcFailed => "webrtc_failed",
            Self::Unknown => "unknown",
        }
    }

    /// Rank in the documented precedence; higher wins
    const fn specificity(self) -> u8 {
        match self {
            Self::NotFound => 7,
            Self::Unauthorized => 6,
            Self::Network => 5,
            Self::Cors => 4,
            Self::Timeout => 3,
            Self::WebrtcFailed => 2,
            Self::ProxyUnavailable => 1,
            Self::Unknown => 0,
        }
    }

    /// Classify one transport failure
    #[must_use]
    pub fn of(error: &TransportError) -> Self {
        match error {
            TransportError::Timeout(_) => Self::Timeout,
            TransportError::Network(_) => Self::Network,
            TransportError::CrossOrigin(_) => Self::Cors,
            TransportError::Status(401 | 403) => Self::Unauthorized,
            TransportError::Status(404) => Self::NotFound,
            TransportError::ProxyUnavailable => Self::ProxyUnavailable,
            TransportError::SignalingUnavailable | TransportError::Peer(_) => Self::WebrtcFailed,
            TransportError::Status(_)
            | TransportError::ExtensionUnavailable
            | TransportError::Rejected(_) => Self::Unknown,
        }
    }
}

/// Which strategy delivered a command, in result form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Peer data channel
    Webrtc,
    /// Local proxy relay
    Proxy,
    /// Browser-extension bridge
    Extension,
    /// Plain HTTP to the device
    Direct,
    /// Nothing succeeded
    None,
}

impl From<TransportKind> for DeliveryMethod {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Webrtc => Self::Webrtc,
            TransportKind::Proxy => Self::Proxy,
            TransportKind::Extension => Self::Extension,
            TransportKind::Direct => Self::Direct,
        }
    }
}

/// What the caller gets back from a dispatch
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    /// Whether any strategy delivered the command
    pub success: bool,

    /// Strategy that delivered it, or `none`
    pub method: DeliveryMethod,

    /// Whether the delivery was acknowledged rather than merely completed
    /// (direct sends are never acknowledged)
    pub confirmed: bool,

    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Classified failure category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    /// Ordered troubleshooting steps, non-empty on failure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub troubleshooting: Vec<String>,
}

impl CommandOutcome {
    /// A successful delivery via a strategy
    #[must_use]
    pub fn delivered(kind: TransportKind, confirmed: bool) -> Self {
        Self {
            success: true,
            method: kind.into(),
            confirmed,
            error: None,
            error_kind: None,
            troubleshooting: Vec::new(),
        }
    }

    /// A failure with an explicit kind, message, and guidance
    #[must_use]
    pub fn failed(kind: ErrorKind, error: impl Into<String>, troubleshooting: Vec<String>) -> Self {
        debug_assert!(!troubleshooting.is_empty());
        Self {
            success: false,
            method: DeliveryMethod::None,
            confirmed: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            troubleshooting,
        }
    }
}

/// Reduce the failed attempts of one dispatch to a structured outcome
///
/// `brand` selects the guidance appended after the generic steps.
#[must_use]
pub fn classify(attempts: &[Attempt], brand: Brand) -> CommandOutcome {
    let chosen = attempts
        .iter()
        .enumerate()
        .max_by_key(|(index, attempt)| {
            // Invert the index so the earlier strategy wins ties.
            (
                ErrorKind::of(&attempt.error).specificity(),
                std::cmp::Reverse(*index),
            )
        })
        .map(|(_, attempt)| attempt);

    let Some(chosen) = chosen else {
        return CommandOutcome::failed(
            ErrorKind::Unknown,
            "no transport strategy was attempted",
            vec!["Check that a device is selected and reachable".to_string()],
        );
    };

    let kind = ErrorKind::of(&chosen.error);
    let mut steps: Vec<String> = generic_steps(kind).iter().map(ToString::to_string).collect();
    steps.extend(brand_steps(brand).iter().map(ToString::to_string));

    CommandOutcome::failed(
        kind,
        format!("{}: {}", chosen.kind, chosen.error),
        steps,
    )
}

/// Generic troubleshooting steps per failure category
fn generic_steps(kind: ErrorKind) -> &'static [&'static str] {
    match kind {
        ErrorKind::Timeout => &[
            "Verify the device's network address is correct",
            "Make sure this machine and the TV are on the same network",
            "Check that the TV is powered on and awake",
            "Restart the TV and your router if the problem persists",
        ],
        ErrorKind::Cors => &[
            "Use the vendor's official remote app",
            "Install a CORS-disabling browser extension",
            "Set up the local proxy server so commands bypass the browser",
            "Fall back to the physical remote",
        ],
        ErrorKind::Network => &[
            "Check WiFi connectivity on both this machine and the TV",
            "Verify both are on the same network segment",
            "Refresh and retry",
            "Restart your router if the problem persists",
        ],
        ErrorKind::Unauthorized => &[
            "Enable external control / remote connections in the TV's settings",
            "The TV may require a pairing step before accepting commands",
        ],
        ErrorKind::NotFound => &[
            "Verify the device address is current; DHCP may have reassigned it",
            "Check your router's admin panel for the TV's current address",
        ],
        ErrorKind::ProxyUnavailable => &[
            "Start the local proxy server, then retry",
            "Confirm the proxy's port is in the configured candidate list",
            "Verify the device address is correct",
        ],
        ErrorKind::WebrtcFailed => &[
            "No pairing channel is configured for direct peer sessions",
            "Use the proxy or direct strategy instead",
        ],
        ErrorKind::Unknown => &[
            "Verify the device address and that the TV is powered on",
            "Retry, or switch to a different device",
        ],
    }
}

/// Brand-specific guidance, appended after the generic steps
fn brand_steps(brand: Brand) -> &'static [&'static str] {
    match brand {
        Brand::Roku => &[
            "Roku: enable External Control under Settings > System > Advanced system settings > Control by mobile apps",
            "Roku: find the device IP under Settings > Network > About",
        ],
        Brand::Samsung => &[
            "Samsung: enable IP remote under Settings > General > External Device Manager > Device Connection Manager",
            "Samsung: approve this device on the TV screen when prompted",
        ],
        Brand::Lg => &[
            "LG: enable LG Connect Apps under Settings > Network",
            "LG: full control requires the webOS pairing flow; accept the prompt on the TV",
        ],
        Brand::Sony => &[
            "Sony: enable Remote start and IP control under Settings > Network > Home Network",
            "Sony: set the authentication mode to Normal or configure a pre-shared key",
        ],
        Brand::Apple | Brand::Other => &[
            "Check the vendor's settings for a 'remote control over network' option",
        ],
    }
}
