//! Notification error types.

use std::fmt;

/// Email delivery errors.
#[derive(Debug)]
pub enum NotifyError {
    /// The SMTP relay could not be configured.
    InvalidTransport {
        /// Error details.
        details: String,
    },
    /// A message could not be assembled.
    InvalidMessage {
        /// Error details.
        details: String,
    },
    /// The SMTP submission failed.
    SendFailed {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransport { details } => {
                write!(f, "invalid SMTP transport configuration: {details}")
            }
            Self::InvalidMessage { details } => {
                write!(f, "could not build email message: {details}")
            }
            Self::SendFailed { details } => {
                write!(f, "failed to send email: {details}")
            }
        }
    }
}

impl std::error::Error for NotifyError {}
