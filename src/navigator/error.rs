// SPDX-License-Identifier: MIT

//! Application-level errors for the advisory service

use thiserror::Error;

use crate::flow::{FlowError, StoreError};

/// Top-level error type for navigator-rs
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// Pipeline construction or run bookkeeping failed
    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),

    /// Configuration errors (malformed env vars, missing catalog)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// A checkpoint names a pipeline this service does not run
    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    /// Generic error wrapper
    #[error("{0}")]
    Other(String),
}

impl NavigatorError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether the caller asked to resume a session with nothing pending
    pub fn is_no_pending_interrupt(&self) -> bool {
        matches!(self, Self::Flow(FlowError::NoPendingInterrupt { .. }))
    }
}

impl From<StoreError> for NavigatorError {
    fn from(err: StoreError) -> Self {
        Self::Flow(FlowError::Store(err))
    }
}

impl From<&str> for NavigatorError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for NavigatorError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pending_interrupt_detection() {
        let err: NavigatorError = FlowError::NoPendingInterrupt {
            session_id: "s".to_string(),
        }
        .into();
        assert!(err.is_no_pending_interrupt());
        assert!(!NavigatorError::from("boom").is_no_pending_interrupt());
    }

    #[test]
    fn test_store_error_is_a_flow_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: NavigatorError = StoreError::from(io).into();
        assert!(matches!(err, NavigatorError::Flow(FlowError::Store(_))));
    }

    #[test]
    fn test_config_message() {
        let err = NavigatorError::config("NAVIGATOR_PORT must be a port number");
        assert_eq!(
            err.to_string(),
            "Configuration error: NAVIGATOR_PORT must be a port number"
        );
    }
}
