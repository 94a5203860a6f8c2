//! Booking creation, lookup, and mutation.
//!
//! The reservation service is the single writer of booking state. Its
//! validation order is part of the contract: dates first, then the user,
//! then the category, then availability. Error precedence is observable by
//! the model and covered by tests.

use crate::availability::validate_range;
use crate::confirm::ConfirmationSender;
use crate::error::{BookingError, ConflictError, NotFoundError, ValidationError};
use crate::model::{
    BookingConfirmation, BookingStatus, BookingSummary, RoomCategory, nights_between,
};
use crate::store::{BookingStore, ReserveOutcome};
use chrono::NaiveDate;
use concierge_core::id::BookingId;
use std::str::FromStr;
use std::sync::Arc;

/// Creates and mutates bookings on behalf of guests.
pub struct ReservationService<S> {
    store: S,
    confirmations: Option<Arc<dyn ConfirmationSender>>,
}

impl<S: BookingStore> ReservationService<S> {
    /// Creates a service over the given store, with confirmations disabled.
    pub fn new(store: S) -> Self {
        Self { store, confirmations: None }
    }

    /// Enables background confirmation delivery through the given sender.
    #[must_use]
    pub fn with_confirmation_sender(mut self, sender: Arc<dyn ConfirmationSender>) -> Self {
        self.confirmations = Some(sender);
        self
    }

    /// Books one room of the requested type over [check_in, check_out).
    ///
    /// With `room_number` given, exactly that room is booked if it exists,
    /// matches the type, and is free. Without it, the lowest-numbered free
    /// room of the type is picked. Guest capacity is not checked here; the
    /// assistant's instructions steer the model toward suitable types.
    pub async fn book_room(
        &self,
        today: NaiveDate,
        email: &str,
        room_type: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_number: Option<i32>,
    ) -> Result<BookingConfirmation, BookingError> {
        validate_range(today, check_in, check_out)?;

        let user = self
            .store
            .user_by_email(email)
            .await?
            .ok_or_else(|| NotFoundError::User { email: email.to_string() })?;

        let category = RoomCategory::from_str(room_type)
            .map_err(|e| ValidationError::InvalidCategory { given: e.given })?;

        let rooms = self.store.rooms_by_category(Some(category)).await?;
        let blocked = self.store.blocked_room_ids(check_in, check_out).await?;

        let candidate = match room_number {
            Some(number) => rooms
                .iter()
                .find(|rwt| rwt.room.room_no == number && !blocked.contains(&rwt.room.id))
                .ok_or(ConflictError::RoomUnavailable { room_number: number })?,
            // Rooms arrive ordered by room number; the first free one is
            // the documented tie-break.
            None => rooms
                .iter()
                .find(|rwt| !blocked.contains(&rwt.room.id))
                .ok_or_else(|| NotFoundError::NoRoomsOfType { given: room_type.to_string() })?,
        };

        let booking = match self
            .store
            .reserve_room(user.id, candidate.room.id, check_in, check_out)
            .await?
        {
            ReserveOutcome::Reserved(booking) => booking,
            ReserveOutcome::Unavailable => {
                return Err(ConflictError::RoomUnavailable {
                    room_number: candidate.room.room_no,
                }
                .into());
            }
        };

        let nights = nights_between(check_in, check_out);
        let confirmation = BookingConfirmation {
            booking_id: booking.id,
            guest_email: user.email.clone(),
            room_number: candidate.room.room_no,
            room_type: category,
            check_in,
            check_out,
            nights,
            cost_per_night: candidate.room_type.cost_per_night,
            total_cost: candidate.room_type.cost_per_night * nights as f64,
            status: booking.status,
            booking_date: booking.created_at,
        };

        if let Some(sender) = &self.confirmations {
            let sender = Arc::clone(sender);
            let sent = confirmation.clone();
            tokio::spawn(async move {
                if let Err(e) = sender.send_confirmation(&sent).await {
                    tracing::error!(
                        error = %e,
                        email = %sent.guest_email,
                        booking_id = %sent.booking_id,
                        "failed to send booking confirmation"
                    );
                }
            });
        }

        Ok(confirmation)
    }

    /// Bookings whose check-in is after `today`.
    pub async fn upcoming_bookings(
        &self,
        today: NaiveDate,
        email: &str,
    ) -> Result<Vec<BookingSummary>, BookingError> {
        self.bookings_where(email, |check_in, _| check_in > today).await
    }

    /// Bookings covering `today`: checked in, not yet checked out.
    pub async fn ongoing_bookings(
        &self,
        today: NaiveDate,
        email: &str,
    ) -> Result<Vec<BookingSummary>, BookingError> {
        self.bookings_where(email, |check_in, check_out| check_in <= today && today <= check_out)
            .await
    }

    /// Bookings whose check-out is before `today`.
    pub async fn past_bookings(
        &self,
        today: NaiveDate,
        email: &str,
    ) -> Result<Vec<BookingSummary>, BookingError> {
        self.bookings_where(email, |_, check_out| check_out < today).await
    }

    /// Moves a booking to new dates.
    ///
    /// The dates are rewritten in place; room availability for the new
    /// range is not re-checked.
    pub async fn update_booking(
        &self,
        email: &str,
        booking_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<BookingSummary, BookingError> {
        let user = self.user_for(email).await?;
        let id = parse_booking_id(booking_id, email)?;
        let record = self
            .store
            .booking_for_user(id, user.id)
            .await?
            .ok_or_else(|| not_found(booking_id, email))?;

        if self.store.holds_booking_for_dates(user.id, check_in, check_out).await? {
            return Err(ConflictError::DuplicateBooking.into());
        }

        let updated =
            self.store.update_booking_dates(record.booking.id, check_in, check_out).await?;
        Ok(updated.summary())
    }

    /// Cancels a booking. Irreversible through this interface.
    pub async fn cancel_booking(
        &self,
        email: &str,
        booking_id: &str,
    ) -> Result<BookingSummary, BookingError> {
        let user = self.user_for(email).await?;
        let id = parse_booking_id(booking_id, email)?;
        let record = self
            .store
            .booking_for_user(id, user.id)
            .await?
            .ok_or_else(|| not_found(booking_id, email))?;

        if record.booking.status == BookingStatus::Cancelled {
            return Err(ConflictError::AlreadyCancelled { id: booking_id.to_string() }.into());
        }

        let cancelled = self.store.cancel_booking(record.booking.id).await?;
        Ok(cancelled.summary())
    }

    async fn user_for(&self, email: &str) -> Result<crate::model::User, BookingError> {
        Ok(self
            .store
            .user_by_email(email)
            .await?
            .ok_or_else(|| NotFoundError::User { email: email.to_string() })?)
    }

    async fn bookings_where(
        &self,
        email: &str,
        keep: impl Fn(NaiveDate, NaiveDate) -> bool,
    ) -> Result<Vec<BookingSummary>, BookingError> {
        let user = self.user_for(email).await?;
        let records = self.store.bookings_for_user(user.id).await?;
        Ok(records
            .iter()
            .filter(|r| keep(r.booking.check_in, r.booking.check_out))
            .map(|r| r.summary())
            .collect())
    }
}

fn not_found(booking_id: &str, email: &str) -> NotFoundError {
    NotFoundError::Booking { id: booking_id.to_string(), email: email.to_string() }
}

// An id that does not parse reads the same to the model as one that does
// not exist.
fn parse_booking_id(raw: &str, email: &str) -> Result<BookingId, NotFoundError> {
    BookingId::from_str(raw).map_err(|_| not_found(raw, email))
}
