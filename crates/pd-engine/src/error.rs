//! Error types for pd-engine

use crate::classify::{ErrorKind, RemoteError};
use std::path::PathBuf;
use std::time::Duration;

/// Result type for pd-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling a resource
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A classified failure from the remote API
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local precondition violated before any network call
    #[error("{resource}: {message}")]
    Validation {
        resource: &'static str,
        message: String,
    },

    #[error(
        "Error importing {resource}. Expecting an import ID formed as '{format}' ({expected} component(s)), got {raw:?}"
    )]
    ImportFormat {
        resource: &'static str,
        raw: String,
        format: &'static str,
        expected: usize,
    },

    /// No exact match for a lookup filter
    #[error("Unable to locate any {resource} with the {field}: {value}")]
    LookupNotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Cannot {operation} {resource}: no remote identity in local state")]
    MissingIdentity {
        resource: &'static str,
        operation: &'static str,
    },

    /// Local state could not be converted to or from its attribute map
    #[error("Invalid attributes: {message}")]
    Attributes { message: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn validation(resource: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            resource,
            message: message.into(),
        }
    }

    /// Where this failure sits in the retry taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote(remote) => remote.kind,
            Self::LookupNotFound { .. } => ErrorKind::NotFound,
            Self::Validation { .. }
            | Self::ImportFormat { .. }
            | Self::MissingIdentity { .. }
            | Self::Attributes { .. } => ErrorKind::Validation,
            Self::Io { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigSerialize { .. }
            | Self::UnsupportedFormat { .. } => ErrorKind::Permanent,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Remote(remote) => remote.retry_after,
            _ => None,
        }
    }

    /// The classified remote failure, if this error came from the API.
    pub fn as_remote(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote(remote) => Some(remote),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_not_found_names_value() {
        let err = Error::LookupNotFound {
            resource: "schedule",
            field: "name",
            value: "OnCallRotationA".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to locate any schedule with the name: OnCallRotationA"
        );
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_import_format_describes_expected_shape() {
        let err = Error::ImportFormat {
            resource: "pagerduty_service_integration",
            raw: "PSVC123".into(),
            format: "<service_id>.<integration_id>",
            expected: 2,
        };
        let display = err.to_string();
        assert!(display.contains("<service_id>.<integration_id>"), "got: {}", display);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_remote_kind_passes_through() {
        let err = Error::from(RemoteError::new(ErrorKind::RateLimited, "slow down"));
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.as_remote().is_some());
    }
}
