//! Error types for the AI crate.

use std::fmt;

/// Errors from model backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Request could not be sent or the connection failed mid-flight.
    RequestFailed { reason: String },
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// Response body did not match the expected shape.
    ResponseParseFailed { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::Api { status, message } => {
                write!(f, "LLM API returned status {status}: {message}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = LlmError::Api {
            status: 429,
            message: "rate limit exceeded".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limit exceeded"));
    }

    #[test]
    fn parse_error_display() {
        let err = LlmError::ResponseParseFailed {
            reason: "missing field `choices`".to_string(),
        };
        assert!(err.to_string().contains("missing field `choices`"));
    }
}
