//! Conversation vector memory for the concierge platform.
//!
//! This crate provides:
//!
//! - **Conversation Memory**: Per-conversation similarity-addressable storage
//! - **Vector Memory**: In-process implementation over an embedding backend

pub mod error;
pub mod memory;
pub mod vector;

pub use error::MemoryError;
pub use memory::{ConversationMemory, MemoryEntry};
pub use vector::VectorMemory;
