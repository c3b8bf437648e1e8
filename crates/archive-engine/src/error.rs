//! Error types for engine and migration calls.

use thiserror::Error;

/// Errors returned by the destination engine or the migration endpoint.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request could not be sent or the connection failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The server answered with a non-success status
    #[error("Engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not what the API promises
    #[error("Failed to parse engine response: {0}")]
    Parse(String),

    /// The client could not be built
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl EngineError {
    /// HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            EngineError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Http(err.to_string())
    }
}
