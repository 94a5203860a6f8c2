//! Conversational assistant loop for the concierge platform.
//!
//! This crate provides:
//!
//! - **Orchestrator**: The model loop turning guest messages into replies
//! - **Tool Registry**: Declarations and argument parsing for the booking tools
//! - **Tool Dispatcher**: Execution of tool requests against the booking domain
//! - **Message Store**: Persistence traits for conversations and their messages

pub mod dispatch;
pub mod error;
pub mod memory;
pub mod message;
pub mod orchestrator;
mod summary;
pub mod tool;

pub use dispatch::{ToolDispatcher, ToolOutcome};
pub use error::{OrchestrationError, StoreError, ToolError};
pub use memory::{InMemoryConversationStore, InMemoryMessageStore};
pub use message::{
    Conversation, ConversationStore, Message, MessageStore, Sender, UnknownSender,
};
pub use orchestrator::{AssistantConfig, Orchestrator};
pub use tool::{ToolRegistry, ToolRequest};
