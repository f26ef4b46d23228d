//! Error types for the TVLink gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the TVLink gateway
///
/// Transport-level failures are deliberately *not* represented here; they are
/// data for the error classifier (see [`crate::transport::TransportError`])
/// and never abort a dispatch on their own.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Device not found in the registry
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// Command could not be parsed from its name/value form
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// Discovery error
    #[error("discovery error: {0}")]
    Discovery(String),

    /// Control API error
    #[error("api error: {0}")]
    Api(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
