//! Error types for Atlas.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for Atlas operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// Transport errors (service unreachable, connection reset, timeouts).
    #[error("Connection error: {0}")]
    Connection(String),

    /// The data service answered with a non-success status.
    #[error("Service error ({status}): {}", .detail.as_deref().unwrap_or("no detail provided"))]
    Service {
        /// HTTP status code returned by the service.
        status: u16,
        /// Human-readable failure detail, when the service provided one.
        detail: Option<String>,
    },

    /// Response bodies that do not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration errors (invalid config file, bad gateway URL, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, panicked tasks, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AtlasError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a service error for the given status and optional detail.
    pub fn service(status: u16, detail: Option<String>) -> Self {
        Self::Service { status, detail }
    }

    /// Creates a decode error with the given message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the failure detail supplied by the data service, if any.
    ///
    /// Only service errors carry a detail; transport and decode failures
    /// return `None` so callers can fall back to a generic message.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Service { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Service { .. } => "Service Error",
            Self::Decode(_) => "Decode Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_connection() {
        let err = AtlasError::connection("Cannot reach localhost:8000");
        assert_eq!(
            err.to_string(),
            "Connection error: Cannot reach localhost:8000"
        );
        assert_eq!(err.category(), "Connection Error");
    }

    #[test]
    fn test_error_display_service_with_detail() {
        let err = AtlasError::service(500, Some("syntax error near SELECT".to_string()));
        assert_eq!(
            err.to_string(),
            "Service error (500): syntax error near SELECT"
        );
        assert_eq!(err.category(), "Service Error");
        assert_eq!(err.detail(), Some("syntax error near SELECT"));
    }

    #[test]
    fn test_error_display_service_without_detail() {
        let err = AtlasError::service(502, None);
        assert_eq!(err.to_string(), "Service error (502): no detail provided");
        assert_eq!(err.detail(), None);
    }

    #[test]
    fn test_detail_only_for_service_errors() {
        assert_eq!(AtlasError::connection("refused").detail(), None);
        assert_eq!(AtlasError::decode("bad json").detail(), None);
        assert_eq!(AtlasError::internal("panicked").detail(), None);
    }

    #[test]
    fn test_error_display_config() {
        let err = AtlasError::config("gateway url must use http or https");
        assert_eq!(
            err.to_string(),
            "Configuration error: gateway url must use http or https"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AtlasError>();
    }
}
