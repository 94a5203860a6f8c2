//! Error types for the memory crate.

use std::fmt;

/// Errors from conversation memory operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// Embedding the texts failed.
    Embedding { reason: String },
    /// `add_texts` was called with mismatched text and metadata counts.
    MetadataMismatch { texts: usize, metadatas: usize },
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedding { reason } => {
                write!(f, "embedding failed: {reason}")
            }
            Self::MetadataMismatch { texts, metadatas } => {
                write!(
                    f,
                    "metadata count {metadatas} does not match text count {texts}"
                )
            }
        }
    }
}

impl std::error::Error for MemoryError {}
