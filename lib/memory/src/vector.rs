//! In-process vector memory backed by an embedding backend.

use crate::error::MemoryError;
use crate::memory::{ConversationMemory, MemoryEntry};
use async_trait::async_trait;
use concierge_ai::EmbeddingBackend;
use concierge_core::ConversationId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

struct StoredEntry {
    text: String,
    metadata: HashMap<String, String>,
    embedding: Vec<f32>,
}

/// Conversation memory holding embeddings in process, one collection
/// per conversation.
#[derive(Clone)]
pub struct VectorMemory {
    embedder: Arc<dyn EmbeddingBackend>,
    collections: Arc<Mutex<HashMap<ConversationId, Vec<StoredEntry>>>>,
}

impl VectorMemory {
    /// Creates a new memory over the given embedding backend.
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self {
            embedder,
            collections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the number of entries stored for a conversation.
    pub async fn entry_count(&self, conversation_id: ConversationId) -> usize {
        let collections = self.collections.lock().await;
        collections
            .get(&conversation_id)
            .map_or(0, |entries| entries.len())
    }
}

#[async_trait]
impl ConversationMemory for VectorMemory {
    async fn add_texts(
        &self,
        conversation_id: ConversationId,
        texts: &[String],
        metadatas: &[HashMap<String, String>],
    ) -> Result<(), MemoryError> {
        if texts.len() != metadatas.len() {
            return Err(MemoryError::MetadataMismatch {
                texts: texts.len(),
                metadatas: metadatas.len(),
            });
        }
        if texts.is_empty() {
            return Ok(());
        }

        let embeddings = self
            .embedder
            .embed(texts)
            .await
            .map_err(|e| MemoryError::Embedding {
                reason: e.to_string(),
            })?;

        let mut collections = self.collections.lock().await;
        let collection = collections.entry(conversation_id).or_default();
        for ((text, metadata), embedding) in texts.iter().zip(metadatas).zip(embeddings) {
            collection.push(StoredEntry {
                text: text.clone(),
                metadata: metadata.clone(),
                embedding,
            });
        }
        tracing::debug!(
            conversation_id = %conversation_id,
            added = texts.len(),
            total = collection.len(),
            "stored conversation memory"
        );
        Ok(())
    }

    async fn similarity_search(
        &self,
        conversation_id: ConversationId,
        query: &str,
        k: usize,
    ) -> Result<Vec<MemoryEntry>, MemoryError> {
        let query_embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(|e| MemoryError::Embedding {
                reason: e.to_string(),
            })?
            .into_iter()
            .next()
            .unwrap_or_default();

        let collections = self.collections.lock().await;
        let Some(collection) = collections.get(&conversation_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<(f32, &StoredEntry)> = collection
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, entry)| MemoryEntry::new(entry.text.clone(), entry.metadata.clone()))
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_ai::LlmError;

    /// Maps each known word to a fixed axis so similarity is predictable.
    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingBackend for AxisEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut v = vec![0.0, 0.0, 0.0];
                    if text.contains("pool") {
                        v[0] = 1.0;
                    }
                    if text.contains("breakfast") {
                        v[1] = 1.0;
                    }
                    if text.contains("parking") {
                        v[2] = 1.0;
                    }
                    v
                })
                .collect())
        }
    }

    fn metadata(sender: &str) -> HashMap<String, String> {
        let mut tags = HashMap::new();
        tags.insert("sender".to_string(), sender.to_string());
        tags
    }

    fn memory() -> VectorMemory {
        VectorMemory::new(Arc::new(AxisEmbedder))
    }

    #[tokio::test]
    async fn search_returns_most_similar_first() {
        let memory = memory();
        let conversation = ConversationId::new();
        memory
            .add_texts(
                conversation,
                &[
                    "Is the pool open late?".to_string(),
                    "Do you serve breakfast?".to_string(),
                ],
                &[metadata("User"), metadata("User")],
            )
            .await
            .expect("add");

        let hits = memory
            .similarity_search(conversation, "pool hours", 2)
            .await
            .expect("search");
        assert_eq!(hits.len(), 2);
        assert!(hits[0].text.contains("pool"));
    }

    #[tokio::test]
    async fn k_caps_the_result_count() {
        let memory = memory();
        let conversation = ConversationId::new();
        let texts: Vec<String> = (0..5).map(|i| format!("pool question {i}")).collect();
        let metadatas: Vec<_> = (0..5).map(|_| metadata("User")).collect();
        memory
            .add_texts(conversation, &texts, &metadatas)
            .await
            .expect("add");

        let hits = memory
            .similarity_search(conversation, "pool", 3)
            .await
            .expect("search");
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn collections_do_not_leak_between_conversations() {
        let memory = memory();
        let first = ConversationId::new();
        let second = ConversationId::new();
        memory
            .add_texts(first, &["pool towels".to_string()], &[metadata("User")])
            .await
            .expect("add");

        let hits = memory
            .similarity_search(second, "pool", 5)
            .await
            .expect("search");
        assert!(hits.is_empty());
        assert_eq!(memory.entry_count(first).await, 1);
        assert_eq!(memory.entry_count(second).await, 0);
    }

    #[tokio::test]
    async fn mismatched_metadata_is_rejected() {
        let memory = memory();
        let err = memory
            .add_texts(
                ConversationId::new(),
                &["a".to_string(), "b".to_string()],
                &[metadata("User")],
            )
            .await
            .expect_err("mismatch");
        assert_eq!(
            err,
            MemoryError::MetadataMismatch {
                texts: 2,
                metadatas: 1
            }
        );
    }

    #[tokio::test]
    async fn metadata_survives_storage() {
        let memory = memory();
        let conversation = ConversationId::new();
        memory
            .add_texts(conversation, &["pool".to_string()], &[metadata("AI")])
            .await
            .expect("add");

        let hits = memory
            .similarity_search(conversation, "pool", 1)
            .await
            .expect("search");
        assert_eq!(hits[0].metadata.get("sender").map(String::as_str), Some("AI"));
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn cosine_handles_zero_and_mismatched_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
