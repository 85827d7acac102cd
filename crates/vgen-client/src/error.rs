//! Job client error types.

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Message used when a failure carries no detail of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred during video generation.";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Configuration(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Status check failed: {0}")]
    Poll(String),

    #[error("{0}")]
    Retrieval(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn poll(msg: impl Into<String>) -> Self {
        Self::Poll(msg.into())
    }

    pub fn retrieval(msg: impl Into<String>) -> Self {
        Self::Retrieval(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True if the credential is missing; no request was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ClientError::Configuration(_))
    }

    /// Message suitable for the session's error panel.
    ///
    /// Falls back to [`GENERIC_FAILURE_MESSAGE`] when the error carries no detail.
    pub fn user_message(&self) -> String {
        let detail = match self {
            ClientError::Configuration(msg)
            | ClientError::Submission(msg)
            | ClientError::Poll(msg)
            | ClientError::Retrieval(msg)
            | ClientError::InvalidResponse(msg) => msg,
        };

        if detail.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_keeps_detail() {
        let err = ClientError::submission("connection refused");
        assert_eq!(err.user_message(), "Submission failed: connection refused");
    }

    #[test]
    fn test_user_message_falls_back_without_detail() {
        assert_eq!(ClientError::poll("  ").user_message(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_configuration_predicate() {
        assert!(ClientError::configuration("API_KEY environment variable is not set.").is_configuration());
        assert!(!ClientError::retrieval("404").is_configuration());
    }
}
