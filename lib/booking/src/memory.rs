//! In-memory [`BookingStore`] backend.
//!
//! Backs the unit tests across the workspace. A single mutex guards all
//! state, so the reserve operation's check-then-insert is atomic the same
//! way the relational backend's row lock makes it.

use crate::error::StoreError;
use crate::model::{
    Booking, BookingRecord, BookingStatus, Room, RoomCategory, RoomType, RoomWithType, User,
};
use crate::store::{BookingStore, ReserveOutcome};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use concierge_core::id::{BookingId, RoomId, RoomTypeId, UserId};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    room_types: Vec<RoomType>,
    rooms: Vec<Room>,
    users: Vec<User>,
    bookings: Vec<Booking>,
}

impl Inner {
    fn room_with_type(&self, room_id: RoomId) -> Option<RoomWithType> {
        let room = self.rooms.iter().find(|r| r.id == room_id)?;
        let room_type = self.room_types.iter().find(|rt| rt.id == room.room_type_id)?;
        Some(RoomWithType { room: room.clone(), room_type: room_type.clone() })
    }

    fn record(&self, booking: &Booking) -> BookingRecord {
        let rooms = booking
            .rooms
            .iter()
            .filter_map(|room_id| self.room_with_type(*room_id))
            .collect();
        BookingRecord { booking: booking.clone(), rooms }
    }
}

/// Mutex-guarded store holding all state in process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryBookingStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a room type.
    pub async fn add_room_type(
        &self,
        category: RoomCategory,
        description: &str,
        capacity: i32,
        cost_per_night: f64,
    ) -> RoomType {
        let room_type = RoomType {
            id: RoomTypeId::new(),
            category,
            description: description.to_string(),
            capacity,
            cost_per_night,
        };
        self.inner.lock().await.room_types.push(room_type.clone());
        room_type
    }

    /// Seeds a room.
    pub async fn add_room(&self, room_no: i32, room_type_id: RoomTypeId) -> Room {
        let room = Room { id: RoomId::new(), room_no, room_type_id };
        self.inner.lock().await.rooms.push(room.clone());
        room
    }

    /// Seeds a registered user.
    pub async fn add_user(&self, email: &str, password_hash: &str) -> User {
        let user = User {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.inner.lock().await.users.push(user.clone());
        user
    }

    /// Number of bookings held, across all statuses.
    pub async fn booking_count(&self) -> usize {
        self.inner.lock().await.bookings.len()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn room_types(&self) -> Result<Vec<RoomType>, StoreError> {
        Ok(self.inner.lock().await.room_types.clone())
    }

    async fn rooms_by_category(
        &self,
        category: Option<RoomCategory>,
    ) -> Result<Vec<RoomWithType>, StoreError> {
        let inner = self.inner.lock().await;
        let mut rooms: Vec<RoomWithType> = inner
            .rooms
            .iter()
            .filter_map(|room| inner.room_with_type(room.id))
            .filter(|rwt| category.is_none_or(|c| rwt.room_type.category == c))
            .collect();
        rooms.sort_by_key(|rwt| rwt.room.room_no);
        Ok(rooms)
    }

    async fn blocked_room_ids(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<HashSet<RoomId>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .iter()
            .filter(|b| b.blocks_range(check_in, check_out))
            .flat_map(|b| b.rooms.iter().copied())
            .collect())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn reserve_room(
        &self,
        user_id: UserId,
        room_id: RoomId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<ReserveOutcome, StoreError> {
        let mut inner = self.inner.lock().await;

        // Re-check under the lock; an earlier availability answer may be
        // stale by the time the reservation lands.
        let blocked = inner
            .bookings
            .iter()
            .any(|b| b.rooms.contains(&room_id) && b.blocks_range(check_in, check_out));
        if blocked {
            return Ok(ReserveOutcome::Unavailable);
        }

        let booking = Booking {
            id: BookingId::new(),
            user_id,
            rooms: vec![room_id],
            check_in,
            check_out,
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        };
        inner.bookings.push(booking.clone());
        Ok(ReserveOutcome::Reserved(booking))
    }

    async fn bookings_for_user(&self, user_id: UserId) -> Result<Vec<BookingRecord>, StoreError> {
        let inner = self.inner.lock().await;
        let mut bookings: Vec<&Booking> =
            inner.bookings.iter().filter(|b| b.user_id == user_id).collect();
        bookings.sort_by_key(|b| b.check_in);
        Ok(bookings.into_iter().map(|b| inner.record(b)).collect())
    }

    async fn booking_for_user(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> Result<Option<BookingRecord>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.id == booking_id && b.user_id == user_id)
            .map(|b| inner.record(b)))
    }

    async fn holds_booking_for_dates(
        &self,
        user_id: UserId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.bookings.iter().any(|b| {
            b.user_id == user_id
                && b.check_in == check_in
                && b.check_out == check_out
                && b.status != BookingStatus::Cancelled
        }))
    }

    async fn update_booking_dates(
        &self,
        booking_id: BookingId,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<BookingRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .bookings
            .iter()
            .position(|b| b.id == booking_id)
            .ok_or_else(|| StoreError::Query {
                reason: format!("booking {booking_id} does not exist"),
            })?;
        inner.bookings[position].check_in = check_in;
        inner.bookings[position].check_out = check_out;
        let booking = inner.bookings[position].clone();
        Ok(inner.record(&booking))
    }

    async fn cancel_booking(&self, booking_id: BookingId) -> Result<BookingRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        let position = inner
            .bookings
            .iter()
            .position(|b| b.id == booking_id)
            .ok_or_else(|| StoreError::Query {
                reason: format!("booking {booking_id} does not exist"),
            })?;
        inner.bookings[position].status = BookingStatus::Cancelled;
        let booking = inner.bookings[position].clone();
        Ok(inner.record(&booking))
    }
}
