//! Error types for the conversation crate.

use std::fmt;

/// Errors from message and conversation storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    Unavailable { reason: String },
    /// A query or write failed.
    Query { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => {
                write!(f, "message store unavailable: {reason}")
            }
            Self::Query { reason } => {
                write!(f, "message store query failed: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors from interpreting a model tool request.
///
/// The display text of each variant is what the model sees in the
/// error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The requested tool name is not registered.
    NotFound { name: String },
    /// The argument object is malformed or missing a required field.
    InvalidArguments { reason: String },
    /// A date argument did not parse as `YYYY-MM-DD`.
    InvalidDate { detail: String },
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "Unknown tool '{name}'"),
            Self::InvalidArguments { reason } => {
                write!(f, "Invalid arguments: {reason}")
            }
            Self::InvalidDate { detail } => {
                write!(f, "Invalid date format. Use YYYY-MM-DD. Error: {detail}")
            }
        }
    }
}

impl std::error::Error for ToolError {}

/// Errors the conversation loop cannot contain.
///
/// Everything else inside a round collapses into the apology reply; only
/// storage failures around the loop surface to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestrationError {
    /// Loading prior history failed.
    History { source: StoreError },
    /// Persisting a message failed.
    Persist { source: StoreError },
}

impl fmt::Display for OrchestrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::History { source } => {
                write!(f, "failed to load conversation history: {source}")
            }
            Self::Persist { source } => {
                write!(f, "failed to persist message: {source}")
            }
        }
    }
}

impl std::error::Error for OrchestrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::History { source } | Self::Persist { source } => Some(source),
        }
    }
}
