//! Chat message and tool-call types shared by model backends.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instructions.
    System,
    /// Guest message.
    User,
    /// Model reply.
    Assistant,
    /// Result of a tool the model requested.
    Tool,
}

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Backend-assigned identifier, echoed back in the matching tool-result message.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    pub arguments: String,
}

/// A message in a model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: ChatRole,
    /// The content of the message.
    pub content: String,
    /// Tool invocations carried by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool-role messages, the id of the call this result answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates an assistant text message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Creates an assistant message carrying tool invocations.
    #[must_use]
    pub fn assistant_tool_request(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
        }
    }

    /// Creates a tool-result message answering the call with `tool_call_id`.
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Declaration of a tool offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Name the model must use to address the tool.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON schema for the argument object.
    pub parameters: JsonValue,
}

impl ToolSpec {
    /// Creates a new tool declaration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: JsonValue,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// What the model returned for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Assistant text, empty when the model only requested tools.
    pub content: String,
    /// Tool invocations the model asked for, in order.
    pub tool_calls: Vec<ToolCall>,
}

impl ChatReply {
    /// Creates a plain text reply.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Creates a reply that only requests tools.
    #[must_use]
    pub fn tool_requests(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    /// Returns whether the model asked for at least one tool.
    #[must_use]
    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The assistant message to append back into the sequence, so the model
    /// keeps its own tool intent in context on the next round.
    #[must_use]
    pub fn as_assistant_message(&self) -> ChatMessage {
        ChatMessage::assistant_tool_request(self.content.clone(), self.tool_calls.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(ChatMessage::system("s").role, ChatRole::System);
        assert_eq!(ChatMessage::user("u").role, ChatRole::User);
        assert_eq!(ChatMessage::assistant("a").role, ChatRole::Assistant);

        let result = ChatMessage::tool("call_1", "{}");
        assert_eq!(result.role, ChatRole::Tool);
        assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn reply_with_tool_calls_wants_tools() {
        let reply = ChatReply::tool_requests(vec![ToolCall {
            id: "call_1".to_string(),
            name: "getRoomTypes".to_string(),
            arguments: "{}".to_string(),
        }]);
        assert!(reply.wants_tools());
        assert!(!ChatReply::text("hello").wants_tools());
    }

    #[test]
    fn assistant_message_preserves_tool_intent() {
        let reply = ChatReply::tool_requests(vec![ToolCall {
            id: "call_9".to_string(),
            name: "getRooms".to_string(),
            arguments: r#"{"check_in":"2030-06-10","check_out":"2030-06-12"}"#.to_string(),
        }]);

        let message = reply.as_assistant_message();
        assert_eq!(message.role, ChatRole::Assistant);
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "getRooms");
    }
}
