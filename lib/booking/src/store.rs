//! Storage interface for the booking domain.
//!
//! Every method stands alone: implementations acquire whatever connection or
//! transaction they need inside the call and release it before returning, on
//! success and failure alike. One failed call must never poison the next.

use crate::error::StoreError;
use crate::model::{Booking, BookingRecord, RoomCategory, RoomType, RoomWithType, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use concierge_core::id::{BookingId, RoomId, UserId};
use std::collections::HashSet;

/// Outcome of an atomic room reservation.
#[derive(Debug, Clone, PartialEq)]
pub enum ReserveOutcome {
    /// The room was free and the booking was written.
    Reserved(Booking),
    /// The room was taken for the range when the reservation re-checked
    /// under exclusion.
    Unavailable,
}

/// Data access for rooms, users, and bookings.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// All room types.
    async fn room_types(&self) -> Result<Vec<RoomType>, StoreError>;

    /// All rooms joined with their type, ordered by ascending room number,
    /// optionally restricted to one category.
    async fn rooms_by_category(
        &self,
        category: Option<RoomCategory>,
    ) -> Result<Vec<RoomWithType>, StoreError>;

    /// Room ids referenced by any non-cancelled booking whose interval
    /// overlaps [check_in, check_out).
    async fn blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<HashSet<RoomId>, StoreError>;

    /// Looks up a registered user by email.
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Atomically reserves one room for the range.
    ///
    /// The overlap check and the insert happen under per-room exclusion, so
    /// a reservation that raced past an earlier availability check still
    /// comes back [`ReserveOutcome::Unavailable`] instead of double-booking.
    async fn reserve_room(
        &self,
        user_id: UserId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<ReserveOutcome, StoreError>;

    /// All bookings owned by the user, ordered by ascending check-in date.
    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<BookingRecord>, StoreError>;

    /// One booking, only if it belongs to the user.
    async fn booking_for_user(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Option<BookingRecord>, StoreError>;

    /// Whether the user holds a non-cancelled booking for exactly this date
    /// pair.
    async fn holds_booking_for_dates(
        &self,
        user_id: UserId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, StoreError>;

    /// Rewrites a booking's dates in place; status is untouched.
    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<BookingRecord, StoreError>;

    /// Marks a booking cancelled.
    async fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingRecord, StoreError>;
}
