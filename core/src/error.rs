//! Error types for the auction API client.
//!
//! # Design
//! The backend collapses validation, auth and server errors into a single
//! `FAILED` envelope carrying a human-readable message, so `Failed` is the
//! one variant callers are expected to show to the user. Everything else
//! describes a broken round-trip: transport, undecodable body, bad config.

/// Errors returned by `AuctionClient` parse methods and `AuctionApi` calls.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The server answered with a non-`OK` envelope. Displays exactly the
    /// server-provided message.
    #[error("{}", message.as_deref().unwrap_or("request failed"))]
    Failed { message: Option<String> },

    /// The response body is not an envelope, or its `value` does not match
    /// the expected record shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A price string could not be parsed as a number.
    #[error("invalid price: {0:?}")]
    InvalidPrice(String),

    /// Client configuration could not be resolved.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// The server message of a `Failed` error, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Failed { message } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}
