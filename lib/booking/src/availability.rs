//! Room availability queries.
//!
//! The resolver answers "which rooms are free for this range", where free
//! means not referenced by any non-cancelled booking whose half-open
//! interval overlaps the requested one.

use crate::error::{BookingError, ValidationError};
use crate::model::{
    Availability, AvailabilityOutcome, NoRoomsAvailable, RoomCategory, RoomListing,
    RoomTypeListing, nights_between,
};
use crate::store::BookingStore;
use chrono::NaiveDate;
use std::str::FromStr;

/// Maximum listings returned by one availability query.
const MAX_LISTINGS: usize = 10;

/// Validates a requested stay against the calendar.
pub(crate) fn validate_range(
    today: NaiveDate,
    check_in: NaiveDate,
    check_out: NaiveDate,
) -> Result<(), ValidationError> {
    if check_in >= check_out {
        return Err(ValidationError::InvalidRange);
    }
    if check_in < today {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}

/// Computes free rooms for a date range.
#[derive(Debug, Clone)]
pub struct AvailabilityResolver<S> {
    store: S,
}

impl<S: BookingStore> AvailabilityResolver<S> {
    /// Creates a resolver over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists every room type the hotel offers.
    pub async fn room_types(&self) -> Result<Vec<RoomTypeListing>, BookingError> {
        let types = self.store.room_types().await?;
        Ok(types.iter().map(RoomTypeListing::from).collect())
    }

    /// Finds rooms free over [check_in, check_out), optionally restricted to
    /// one category given as its raw string form.
    ///
    /// Returns at most ten listings, lowest room number first. An empty
    /// result is a normal outcome, not an error.
    pub async fn find_available(
        &self,
        today: NaiveDate,
        check_in: NaiveDate,
        check_out: NaiveDate,
        type_filter: Option<&str>,
    ) -> Result<AvailabilityOutcome, BookingError> {
        validate_range(today, check_in, check_out)?;

        let category = match type_filter {
            Some(raw) => Some(RoomCategory::from_str(raw).map_err(|e| {
                ValidationError::InvalidCategory { given: e.given }
            })?),
            None => None,
        };

        let rooms = self.store.rooms_by_category(category).await?;
        let blocked = self.store.blocked_room_ids(check_in, check_out).await?;
        let nights = nights_between(check_in, check_out);

        let available_rooms: Vec<RoomListing> = rooms
            .into_iter()
            .filter(|rwt| !blocked.contains(&rwt.room.id))
            .take(MAX_LISTINGS)
            .map(|rwt| RoomListing {
                room_id: rwt.room.id,
                room_no: rwt.room.room_no,
                category: rwt.room_type.category,
                description: rwt.room_type.description,
                capacity: rwt.room_type.capacity,
                cost_per_night: rwt.room_type.cost_per_night,
                total_cost: rwt.room_type.cost_per_night * nights as f64,
            })
            .collect();

        if available_rooms.is_empty() {
            return Ok(AvailabilityOutcome::NoneAvailable(NoRoomsAvailable {
                type_filter: type_filter.map(str::to_string),
            }));
        }

        Ok(AvailabilityOutcome::Rooms(Availability {
            available_rooms,
            nights,
            check_in,
            check_out,
        }))
    }
}
