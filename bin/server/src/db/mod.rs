//! Postgres persistence for guests, conversations, and bookings.
//!
//! Each repository wraps a [`sqlx::PgPool`] and exposes typed queries.
//! Ids are stored as their prefixed ULID display form; a stored value
//! that no longer parses surfaces as [`sqlx::Error::Decode`].

pub mod bookings;
pub mod conversations;
pub mod users;

use std::fmt;

/// Decode failure for a stored column value.
pub(crate) fn decode_error(what: &str, value: &str, source: impl fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("invalid {what} '{value}': {source}"),
    )))
}

/// Collapses a pool-level failure into the booking domain's unavailable
/// variant; everything else is a query failure.
pub(crate) fn booking_store_error(e: sqlx::Error) -> concierge_booking::StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            concierge_booking::StoreError::Unavailable {
                reason: e.to_string(),
            }
        }
        other => concierge_booking::StoreError::Query {
            reason: other.to_string(),
        },
    }
}

/// Same mapping for the conversation store.
pub(crate) fn conversation_store_error(e: sqlx::Error) -> concierge_conversation::StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            concierge_conversation::StoreError::Unavailable {
                reason: e.to_string(),
            }
        }
        other => concierge_conversation::StoreError::Query {
            reason: other.to_string(),
        },
    }
}
