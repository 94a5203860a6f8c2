//! Conversation memory trait and entry types.

use crate::error::MemoryError;
use async_trait::async_trait;
use concierge_core::ConversationId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A remembered conversation fragment with its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// The stored text.
    pub text: String,
    /// Tags recorded alongside the text, such as sender and message id.
    pub metadata: HashMap<String, String>,
}

impl MemoryEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(text: impl Into<String>, metadata: HashMap<String, String>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// Long-term memory of a conversation, addressable by similarity.
///
/// Each conversation has its own collection; entries never cross
/// between conversations.
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Embeds and stores texts in the conversation's collection.
    ///
    /// `texts` and `metadatas` must be the same length, pairing each text
    /// with its tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the counts differ or embedding fails.
    async fn add_texts(
        &self,
        conversation_id: ConversationId,
        texts: &[String],
        metadatas: &[HashMap<String, String>],
    ) -> Result<(), MemoryError>;

    /// Returns up to `k` stored entries most similar to `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding the query fails.
    async fn similarity_search(
        &self,
        conversation_id: ConversationId,
        query: &str,
        k: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError>;
}
