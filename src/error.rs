//! Error types for reading sources.

use thiserror::Error;

/// Errors that can occur when fetching readings from the sensor gateway.
///
/// Each failure mode is a separate variant so callers can tell a dead
/// gateway from one that answers with garbage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The gateway could not be reached.
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The gateway did not answer in time.
    #[error("Request timed out")]
    Timeout,

    /// The gateway answered with a non-success status code.
    #[error("HTTP error! Status: {0}")]
    HttpStatus(u16),

    /// The body was not a JSON array.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// One or more elements lack a usable concentration.
    #[error("Invalid reading: {0}")]
    Schema(String),

    /// A count of zero was requested.
    #[error("Record count must be at least 1")]
    InvalidCount,

    /// The source could not be set up (missing gateway, HTTP client init).
    #[error("Invalid source configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            FetchError::Config(err.to_string())
        } else if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
