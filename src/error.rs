//! Provider errors
//!
//! Every lifecycle operation returns [`ProviderResult`]. The variants keep
//! transport, decode, status, absence, timeout and validation failures apart
//! so callers (and the reconciler) can decide what is retryable.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the API client, the reconciler and the controllers
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (connection, TLS, client timeout)
    #[error("Error completing request: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be interpreted
    #[error("Error decoding {context}: {message}")]
    Decode { context: String, message: String },

    /// The API answered with a status the operation does not accept
    #[error("Error on {operation}: status code {status}, response: {body}")]
    Status {
        operation: String,
        status: u16,
        body: String,
    },

    /// The remote object does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// A reconciliation loop ran past its deadline
    #[error("{operation} did not complete within {}s", timeout.as_secs())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// Missing or inconsistent input
    #[error("{0}")]
    Validation(String),

    /// Provider configuration problem
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn status(operation: impl Into<String>, status: u16, body: &serde_json::Value) -> Self {
        Self::Status {
            operation: operation.into(),
            status,
            body: crate::api::http::sanitize_for_log(&body.to_string()),
        }
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn decode(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether a poll loop should try again after this error.
    ///
    /// Absence counts as retryable: objects routinely appear in reads a few
    /// seconds after the create call returns.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::NotFound { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } | Self::Timeout { .. } | Self::Validation(_) | Self::Config(_) => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_classification() {
        let throttled = ProviderError::status("GetMachine", 429, &json!({}));
        let unavailable = ProviderError::status("GetMachine", 503, &json!({}));
        let forbidden = ProviderError::status("GetMachine", 403, &json!({"error": "nope"}));

        assert!(throttled.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!forbidden.is_retryable());
    }

    #[test]
    fn test_not_found_is_distinguishable() {
        let err = ProviderError::not_found("machine", "ps123");
        assert!(err.is_not_found());
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "machine not found: ps123");
    }

    #[test]
    fn test_timeout_message() {
        let err = ProviderError::Timeout {
            operation: "create machine ps123".to_string(),
            timeout: Duration::from_secs(600),
        };
        assert!(err.is_timeout());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "create machine ps123 did not complete within 600s");
    }
}
