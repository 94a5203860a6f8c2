//! Core domain types for the concierge booking assistant.
//!
//! This crate provides the strongly-typed entity identifiers used
//! throughout the workspace.

pub mod id;

pub use id::{BookingId, ConversationId, MessageId, ParseIdError, RoomId, RoomTypeId, UserId};
