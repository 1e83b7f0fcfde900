//! Errors raised while fetching trades from the exchange.

use thiserror::Error;

/// Result type alias for feed operations.
pub type FeedResult<T> = std::result::Result<T, FeedError>;

/// Fetch/transport error. Passed to the caller untouched.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Transport or HTTP status failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange answered with a non-empty `error` list.
    #[error("Exchange API error: {0}")]
    Api(String),

    /// The response has no trade list for the requested pair.
    #[error("No trades for pair {0} in response")]
    MissingPair(String),

    /// The response body is not the expected envelope.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
