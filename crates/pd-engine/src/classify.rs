//! Error classification
//!
//! Maps raw client failures onto the small taxonomy the retry controller and
//! reconciler reason about.

use pd_client::Error as ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// What a failure means for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// HTTP 429: retry only after the mandated long delay
    RateLimited,
    /// HTTP 404
    NotFound,
    /// Remote state not yet propagated (eventual consistency)
    Conflict,
    /// HTTP 5xx
    TransientServer,
    /// Anything else the server or transport reported
    Permanent,
    /// A local precondition failed; the network was never touched
    Validation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RateLimited => "rate limited",
            Self::NotFound => "not found",
            Self::Conflict => "conflict",
            Self::TransientServer => "transient server error",
            Self::Permanent => "permanent error",
            Self::Validation => "validation error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified remote failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub retry_after: Option<Duration>,
}

impl RemoteError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {}): {}", self.kind, status, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Status-code classifier.
///
/// Resource-agnostic except for one switch: resources whose dependencies
/// propagate asynchronously can treat HTTP 400 as [`ErrorKind::Conflict`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classifier {
    bad_request_is_conflict: bool,
}

impl Classifier {
    pub const fn new() -> Self {
        Self {
            bad_request_is_conflict: false,
        }
    }

    /// Treat HTTP 400 as "still propagating" rather than permanent.
    pub const fn bad_request_as_conflict() -> Self {
        Self {
            bad_request_is_conflict: true,
        }
    }

    pub fn kind_for_status(&self, status: Option<u16>) -> ErrorKind {
        match status {
            Some(429) => ErrorKind::RateLimited,
            Some(404) => ErrorKind::NotFound,
            Some(400) if self.bad_request_is_conflict => ErrorKind::Conflict,
            Some(500..=599) => ErrorKind::TransientServer,
            _ => ErrorKind::Permanent,
        }
    }

    pub fn classify(&self, err: ClientError) -> RemoteError {
        let status = err.status();
        let retry_after = err.retry_after();
        let message = match &err {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        };

        RemoteError {
            kind: self.kind_for_status(status),
            status,
            message,
            retry_after,
        }
    }
}

/// Classify with the resource-agnostic mapping.
pub fn classify(err: ClientError) -> RemoteError {
    Classifier::new().classify(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(429, ErrorKind::RateLimited)]
    #[case(404, ErrorKind::NotFound)]
    #[case(400, ErrorKind::Permanent)]
    #[case(401, ErrorKind::Permanent)]
    #[case(403, ErrorKind::Permanent)]
    #[case(500, ErrorKind::TransientServer)]
    #[case(503, ErrorKind::TransientServer)]
    #[case(599, ErrorKind::TransientServer)]
    fn test_default_mapping(#[case] status: u16, #[case] expected: ErrorKind) {
        let remote = classify(ClientError::api(status, "boom"));
        assert_eq!(remote.kind, expected);
        assert_eq!(remote.status, Some(status));
    }

    #[test]
    fn test_bad_request_as_conflict() {
        let classifier = Classifier::bad_request_as_conflict();
        assert_eq!(classifier.kind_for_status(Some(400)), ErrorKind::Conflict);
        assert_eq!(classifier.kind_for_status(Some(404)), ErrorKind::NotFound);
        assert_eq!(classifier.kind_for_status(Some(422)), ErrorKind::Permanent);
    }

    #[test]
    fn test_transport_errors_are_permanent() {
        let remote = classify(ClientError::Transport("connection refused".into()));
        assert_eq!(remote.kind, ErrorKind::Permanent);
        assert_eq!(remote.status, None);
        assert!(remote.message.contains("connection refused"));
    }

    #[test]
    fn test_retry_after_hint_is_carried() {
        let err = ClientError::api(429, "slow down").with_retry_after(Duration::from_secs(60));
        let remote = classify(err);
        assert_eq!(remote.retry_after, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_display_mentions_status_and_message() {
        let remote = classify(ClientError::api(404, "Not Found"));
        let display = remote.to_string();
        assert!(display.contains("404"), "got: {}", display);
        assert!(display.contains("Not Found"), "got: {}", display);
    }
}
