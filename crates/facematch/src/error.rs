//! Error types for the comparison client.

use std::time::Duration;

/// Comparison errors.
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    /// Malformed or missing input, detected before any network call.
    #[error("invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    /// The service found no face to compare, in either the source or the
    /// target image. `message` is the service's own text and names which.
    #[error("no face detected: {message}")]
    NoFaceDetected { message: String },

    /// The service refused the request, or answered with a response that
    /// does not match the expected schema.
    #[error("request rejected ({code}): {message}")]
    RemoteRejected { code: String, message: String },

    /// Network or service-side failure (timeout, throttling, 5xx).
    #[error("service unavailable: {message}")]
    RemoteUnavailable {
        message: String,
        retry_after: Option<Duration>,
    },
}

impl ComparisonError {
    pub(crate) fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_response(message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            code: MALFORMED_RESPONSE.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
            retry_after: None,
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidInput { .. } => 1,
            Self::NoFaceDetected { .. } => 4,
            Self::RemoteRejected { .. } => 3,
            // Network/transient
            Self::RemoteUnavailable { .. } => 5,
        }
    }

    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteUnavailable { .. })
    }
}

/// Error code used when a successful response fails schema validation.
pub const MALFORMED_RESPONSE: &str = "MalformedResponse";

impl From<reqwest::Error> for ComparisonError {
    fn from(err: reqwest::Error) -> Self {
        // The request never left the process: bad URL or header.
        if err.is_builder() {
            return Self::invalid_input("request", err.to_string());
        }
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        Self::unavailable(message)
    }
}

/// Result type for comparison operations.
pub type CompareResult<T> = Result<T, ComparisonError>;
