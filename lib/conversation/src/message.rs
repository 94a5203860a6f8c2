//! Message and conversation entities with their storage traits.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use concierge_core::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The originator of a stored message.
///
/// Wire values match the persisted enum: `User`, `AI`, `Tool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    #[serde(rename = "AI")]
    Ai,
    Tool,
}

impl Sender {
    /// Returns the canonical wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Ai => "AI",
            Sender::Tool => "Tool",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSender {
    /// The rejected input.
    pub given: String,
}

impl fmt::Display for UnknownSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sender '{}'", self.given)
    }
}

impl std::error::Error for UnknownSender {}

impl FromStr for Sender {
    type Err = UnknownSender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Sender::User),
            "AI" => Ok(Sender::Ai),
            "Tool" => Ok(Sender::Tool),
            other => Err(UnknownSender {
                given: other.to_string(),
            }),
        }
    }
}

/// A persisted message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Who produced the message.
    pub sender: Sender,
    /// Message text.
    pub content: String,
    /// Tool names reported alongside the message, if any.
    pub tools_used: Option<Vec<String>>,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a new message with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(
        conversation_id: ConversationId,
        sender: Sender,
        content: impl Into<String>,
        tools_used: Option<Vec<String>>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            sender,
            content: content.into(),
            tools_used,
            created_at: Utc::now(),
        }
    }
}

/// A chat conversation owned by a guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// The guest who owns the conversation.
    pub user_id: UserId,
    /// When the conversation was opened.
    pub created_at: DateTime<Utc>,
}

/// Persistence for conversation messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Appends a message and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn append(
        &self,
        conversation_id: ConversationId,
        sender: Sender,
        content: &str,
        tools_used: Option<Vec<String>>,
    ) -> Result<Message, StoreError>;

    /// Returns up to `limit` most recent messages of the conversation,
    /// ordered oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn history(
        &self,
        conversation_id: ConversationId,
        limit: usize,
    ) -> Result<Vec<Message>, StoreError>;
}

/// Persistence for conversations themselves.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Opens a new conversation for the given guest.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn create(&self, user_id: UserId) -> Result<Conversation, StoreError>;

    /// Looks up a conversation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_wire_names() {
        assert_eq!(Sender::User.to_string(), "User");
        assert_eq!(Sender::Ai.to_string(), "AI");
        assert_eq!(Sender::Tool.to_string(), "Tool");

        assert_eq!(
            serde_json::to_string(&Sender::Ai).expect("serialize"),
            "\"AI\""
        );
    }

    #[test]
    fn sender_parses_wire_names_only() {
        assert_eq!("AI".parse::<Sender>(), Ok(Sender::Ai));
        assert_eq!("Tool".parse::<Sender>(), Ok(Sender::Tool));

        let err = "ai".parse::<Sender>().unwrap_err();
        assert_eq!(err.given, "ai");
    }

    #[test]
    fn message_constructor_fills_id_and_timestamp() {
        let conversation = ConversationId::new();
        let message = Message::new(conversation, Sender::User, "Hi!", None);
        assert_eq!(message.conversation_id, conversation);
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.content, "Hi!");
        assert!(message.tools_used.is_none());
    }
}
