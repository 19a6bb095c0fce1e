//! Error types for pd-resources

/// Result type for pd-resources operations
pub type Result<T> = std::result::Result<T, Error>;

/// Failures while assembling the provider
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP client could not be built
    #[error("Failed to build API client: {0}")]
    Client(#[from] pd_client::Error),

    #[error(transparent)]
    Engine(#[from] pd_engine::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_errors_pass_through() {
        let err = Error::from(pd_engine::Error::validation("pagerduty_addon", "src must be set"));
        assert_eq!(err.to_string(), "pagerduty_addon: src must be set");
    }

    #[test]
    fn test_client_errors_are_wrapped() {
        let err = Error::from(pd_client::Error::Transport("connection refused".into()));
        assert!(err.to_string().starts_with("Failed to build API client"));
    }
}
