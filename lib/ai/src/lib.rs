//! Model access for the concierge platform.
//!
//! This crate provides:
//!
//! - **Chat types**: Role-tagged messages and tool-call requests
//! - **Backends**: Chat and embedding traits with an OpenAI-compatible client
//! - **Prompt templates**: `{{variable}}` substitution for system prompts

pub mod backend;
pub mod chat;
pub mod error;
pub mod openai;
pub mod prompt;

pub use backend::{EmbeddingBackend, LlmBackend, LlmConfig};
pub use chat::{ChatMessage, ChatReply, ChatRole, ToolCall, ToolSpec};
pub use error::LlmError;
pub use openai::OpenAiBackend;
pub use prompt::PromptTemplate;
