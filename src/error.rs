//! Error types for the bridge.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failure classes surfaced by the bridge.
///
/// `Display` output is what ends up in the `error` field of a result
/// envelope, so variants carrying pass-through text render it bare while
/// WordPress rejections get the `WordPress API error:` prefix.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable request fields
    #[error("{0}")]
    InvalidRequest(String),

    /// Tool name not recognized
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// WordPress rejected the call
    #[error("WordPress API error: {0}")]
    Api(String),

    /// Transport-level HTTP failure (connect, timeout, decode)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
