//! In-memory message and conversation stores for tests and local runs.

use crate::error::StoreError;
use crate::message::{Conversation, ConversationStore, Message, MessageStore, Sender};
use async_trait::async_trait;
use chrono::Utc;
use concierge_core::{ConversationId, UserId};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message store keeping every row in process memory.
#[derive(Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages across all conversations.
    pub async fn message_count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(
        &self,
        conversation_id: ConversationId,
        sender: Sender,
        content: &str,
        tools_used: Option<Vec<String>>,
    ) -> Result<Message, StoreError> {
        let message = Message::new(conversation_id, sender, content, tools_used);
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn history(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let messages = self.messages.lock().await;
        let matching: Vec<Message> = messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }
}

/// Conversation store keeping rows in process memory.
#[derive(Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<Mutex<Vec<Conversation>>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, user_id: UserId) -> Result<Conversation, StoreError> {
        let conversation = Conversation {
            id: ConversationId::new(),
            user_id,
            created_at: Utc::now(),
        };
        self.conversations.lock().await.push(conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        let conversations = self.conversations.lock().await;
        Ok(conversations.iter().find(|c| c.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_keeps_append_order() {
        let store = InMemoryMessageStore::new();
        let conversation = ConversationId::new();
        store
            .append(conversation, Sender::User, "first", None)
            .await
            .expect("append");
        store
            .append(conversation, Sender::Ai, "second", None)
            .await
            .expect("append");

        let history = store.history(conversation, 10).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "first");
        assert_eq!(history[1].content, "second");
    }

    #[tokio::test]
    async fn history_limit_keeps_most_recent_messages() {
        let store = InMemoryMessageStore::new();
        let conversation = ConversationId::new();
        for i in 0..5 {
            store
                .append(conversation, Sender::User, &format!("message {i}"), None)
                .await
                .expect("append");
        }

        let history = store.history(conversation, 2).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "message 3");
        assert_eq!(history[1].content, "message 4");
    }

    #[tokio::test]
    async fn history_is_scoped_to_the_conversation() {
        let store = InMemoryMessageStore::new();
        let first = ConversationId::new();
        let second = ConversationId::new();
        store
            .append(first, Sender::User, "mine", None)
            .await
            .expect("append");

        let history = store.history(second, 10).await.expect("history");
        assert!(history.is_empty());
        assert_eq!(store.message_count().await, 1);
    }

    #[tokio::test]
    async fn conversations_round_trip() {
        let store = InMemoryConversationStore::new();
        let user = UserId::new();
        let created = store.create(user).await.expect("create");

        let fetched = store.get(created.id).await.expect("get");
        assert_eq!(fetched, Some(created));
        assert_eq!(store.get(ConversationId::new()).await.expect("get"), None);
    }
}
