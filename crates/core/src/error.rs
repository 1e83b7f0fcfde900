//! Error types for the VWAP pipeline.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the VWAP pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The raw trade batch is not a sequence of fixed-arity records.
    #[error("Malformed input at record {index}: {reason}")]
    MalformedInput { index: usize, reason: String },

    /// The display timezone is not a known IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// The pair menu input does not match any configured option.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed input error for the record at `index`.
    pub fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedInput {
            index,
            reason: reason.into(),
        }
    }

    /// Create an invalid timezone error.
    pub fn invalid_timezone(tz: impl Into<String>) -> Self {
        Error::InvalidTimezone(tz.into())
    }

    /// Create an invalid selection error.
    pub fn invalid_selection(input: impl Into<String>) -> Self {
        Error::InvalidSelection(input.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
