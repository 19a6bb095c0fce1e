//! Error types for pd-client

use std::time::Duration;

/// Result type for pd-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the remote API
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Field-level details from the error envelope
        errors: Vec<String>,
        /// Parsed `Retry-After` header, if the server sent one
        retry_after: Option<Duration>,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Build an API error with only a status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            errors: Vec::new(),
            retry_after: None,
        }
    }

    /// Attach a `Retry-After` hint to an API error. Other variants are returned as-is.
    pub fn with_retry_after(self, hint: Duration) -> Self {
        match self {
            Self::Api {
                status,
                message,
                errors,
                ..
            } => Self::Api {
                status,
                message,
                errors,
                retry_after: Some(hint),
            },
            other => other,
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Api { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// True when the response carried the given status code.
    pub fn is_status(&self, code: u16) -> bool {
        self.status() == Some(code)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::api(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}
