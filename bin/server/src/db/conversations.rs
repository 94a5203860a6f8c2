//! Conversation and message storage.

use crate::db::{conversation_store_error, decode_error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_conversation::{
    Conversation, ConversationStore, Message, MessageStore, Sender, StoreError,
};
use concierge_core::{ConversationId, MessageId, UserId};
use sqlx::PgPool;
use std::str::FromStr;

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl ConversationRow {
    fn try_into_conversation(self) -> Result<Conversation, sqlx::Error> {
        let id = ConversationId::from_str(&self.id)
            .map_err(|e| decode_error("conversation id", &self.id, e))?;
        let user_id = UserId::from_str(&self.user_id)
            .map_err(|e| decode_error("user id", &self.user_id, e))?;

        Ok(Conversation {
            id,
            user_id,
            created_at: self.created_at,
        })
    }
}

/// Queries against the `conversations` table.
#[derive(Clone)]
pub struct ConversationRepository {
    pool: PgPool,
}

impl ConversationRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for ConversationRepository {
    async fn create(&self, user_id: UserId) -> Result<Conversation, StoreError> {
        let row: ConversationRow = sqlx::query_as(
            r#"
            INSERT INTO conversations (id, user_id)
            VALUES ($1, $2)
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(ConversationId::new().to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(conversation_store_error)?;

        row.try_into_conversation().map_err(conversation_store_error)
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        let row: Option<ConversationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conversation_store_error)?;

        row.map(|r| r.try_into_conversation().map_err(conversation_store_error))
            .transpose()
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    conversation_id: String,
    sender: String,
    content: String,
    tools_used: Option<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn try_into_message(self) -> Result<Message, sqlx::Error> {
        let id =
            MessageId::from_str(&self.id).map_err(|e| decode_error("message id", &self.id, e))?;
        let conversation_id = ConversationId::from_str(&self.conversation_id)
            .map_err(|e| decode_error("conversation id", &self.conversation_id, e))?;
        let sender =
            Sender::from_str(&self.sender).map_err(|e| decode_error("sender", &self.sender, e))?;

        Ok(Message {
            id,
            conversation_id,
            sender,
            content: self.content,
            tools_used: self.tools_used,
            created_at: self.created_at,
        })
    }
}

/// Queries against the `messages` table.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full history of a conversation, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, conversation_id: ConversationId) -> Result<Vec<Message>, sqlx::Error> {
        // ULID ids sort chronologically, breaking created_at ties.
        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, sender, content, tools_used, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(conversation_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MessageRow::try_into_message).collect()
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append(
        &self,
        conversation_id: ConversationId,
        sender: Sender,
        content: &str,
        tools_used: Option<Vec<String>>,
    ) -> Result<Message, StoreError> {
        let message = Message::new(conversation_id, sender, content, tools_used);

        sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender, content, tools_used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id.to_string())
        .bind(message.conversation_id.to_string())
        .bind(message.sender.as_str())
        .bind(&message.content)
        .bind(message.tools_used.as_deref())
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(conversation_store_error)?;

        Ok(message)
    }

    async fn history(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, conversation_id, sender, content, tools_used, created_at
            FROM (
                SELECT id, conversation_id, sender, content, tools_used, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2
            ) AS recent
            ORDER BY created_at, id
            "#,
        )
        .bind(conversation_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(conversation_store_error)?;

        rows.into_iter()
            .map(|r| r.try_into_message().map_err(conversation_store_error))
            .collect()
    }
}
