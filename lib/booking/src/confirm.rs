//! Outbound confirmation seam.
//!
//! The reservation service emits booking confirmations through this trait.
//! Delivery is best-effort: sends run in the background and a failure is
//! logged, never surfaced to the guest.

use crate::model::BookingConfirmation;
use async_trait::async_trait;
use std::fmt;

/// Failure to deliver a booking confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationError {
    /// Transport-level detail.
    pub reason: String,
}

impl fmt::Display for ConfirmationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "confirmation delivery failed: {}", self.reason)
    }
}

impl std::error::Error for ConfirmationError {}

/// Delivers booking confirmations to guests.
#[async_trait]
pub trait ConfirmationSender: Send + Sync {
    /// Sends one confirmation.
    async fn send_confirmation(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), ConfirmationError>;
}
