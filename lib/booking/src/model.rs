//! Domain entities and payload types for the booking system.
//!
//! Reference data (room types, rooms) is immutable and seeded by migration.
//! Bookings are created by the reservation service and mutated only through
//! the update/cancel operations; they are never physically deleted.

use chrono::{DateTime, NaiveDate, Utc};
use concierge_core::id::{BookingId, RoomId, RoomTypeId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of hotel room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomCategory {
    Standard,
    Deluxe,
    Suite,
}

impl RoomCategory {
    /// All categories, in display order.
    pub const ALL: [RoomCategory; 3] =
        [RoomCategory::Standard, RoomCategory::Deluxe, RoomCategory::Suite];

    /// Returns the canonical name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoomCategory::Standard => "Standard",
            RoomCategory::Deluxe => "Deluxe",
            RoomCategory::Suite => "Suite",
        }
    }

    /// Renders the list of accepted category names for error messages.
    #[must_use]
    pub fn valid_options() -> String {
        let names: Vec<String> = Self::ALL.iter().map(|c| format!("'{c}'")).collect();
        format!("[{}]", names.join(", "))
    }
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known room category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory {
    /// The rejected input.
    pub given: String,
}

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown room category '{}'", self.given)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for RoomCategory {
    type Err = UnknownCategory;

    // Matching is exact; the model is shown the canonical names and is
    // expected to echo them back unchanged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(RoomCategory::Standard),
            "Deluxe" => Ok(RoomCategory::Deluxe),
            "Suite" => Ok(RoomCategory::Suite),
            other => Err(UnknownCategory { given: other.to_string() }),
        }
    }
}

/// A category of rooms with shared pricing and capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomType {
    pub id: RoomTypeId,
    pub category: RoomCategory,
    pub description: String,
    pub capacity: i32,
    pub cost_per_night: f64,
}

/// A physical room in the hotel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub room_no: i32,
    pub room_type_id: RoomTypeId,
}

/// A room joined with its type, as returned by store lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomWithType {
    pub room: Room,
    pub room_type: RoomType,
}

/// A registered guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    /// Returns the canonical name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known booking status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus {
    /// The rejected input.
    pub given: String,
}

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown booking status '{}'", self.given)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Booked" => Ok(BookingStatus::Booked),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(UnknownStatus { given: other.to_string() }),
        }
    }
}

/// A reservation of one or more rooms over a date range.
///
/// The reservation service always books exactly one room, but the data model
/// keeps room references as a set so multi-room bookings remain
/// representable in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub user_id: UserId,
    pub rooms: Vec<RoomId>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether this booking blocks its rooms for the given range.
    ///
    /// Cancelled bookings never block. Intervals are half-open
    /// [check-in, check-out): two ranges overlap when each starts before the
    /// other ends.
    #[must_use]
    pub fn blocks_range(&self, check_in: NaiveDate, check_out: NaiveDate) -> bool {
        self.status != BookingStatus::Cancelled
            && self.check_in < check_out
            && self.check_out > check_in
    }
}

/// Number of calendar nights between two dates.
#[must_use]
pub fn nights_between(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
    (check_out - check_in).num_days()
}

/// One room type as presented to the model by `getRoomTypes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomTypeListing {
    pub id: RoomTypeId,
    #[serde(rename = "type")]
    pub category: RoomCategory,
    pub description: String,
    pub capacity: i32,
    pub cost: f64,
}

impl From<&RoomType> for RoomTypeListing {
    fn from(rt: &RoomType) -> Self {
        Self {
            id: rt.id,
            category: rt.category,
            description: rt.description.clone(),
            capacity: rt.capacity,
            cost: rt.cost_per_night,
        }
    }
}

/// One available room with computed cost fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomListing {
    pub room_id: RoomId,
    pub room_no: i32,
    #[serde(rename = "type")]
    pub category: RoomCategory,
    pub description: String,
    pub capacity: i32,
    pub cost_per_night: f64,
    pub total_cost: f64,
}

/// Successful availability result for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub available_rooms: Vec<RoomListing>,
    pub nights: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// Normal empty-result outcome of an availability query.
///
/// The model handles this conversationally, so it is a result variant
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoRoomsAvailable {
    /// The raw category filter the caller supplied, if any.
    pub type_filter: Option<String>,
}

impl fmt::Display for NoRoomsAvailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_filter {
            Some(t) => {
                write!(f, "No available rooms of type '{t}' found for the specified dates")
            }
            None => write!(f, "No available rooms found for the specified dates"),
        }
    }
}

/// Outcome of an availability query.
#[derive(Debug, Clone, PartialEq)]
pub enum AvailabilityOutcome {
    /// At least one room is free for the range.
    Rooms(Availability),
    /// No room satisfies the filter; a normal conversational outcome.
    NoneAvailable(NoRoomsAvailable),
}

/// Confirmation returned after a successful booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: BookingId,
    pub guest_email: String,
    pub room_number: i32,
    pub room_type: RoomCategory,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub cost_per_night: f64,
    pub total_cost: f64,
    pub status: BookingStatus,
    pub booking_date: DateTime<Utc>,
}

/// A booking joined with its rooms, as returned by store lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRecord {
    pub booking: Booking,
    pub rooms: Vec<RoomWithType>,
}

impl BookingRecord {
    /// Collapses the record into the summary shape the model sees.
    #[must_use]
    pub fn summary(&self) -> BookingSummary {
        BookingSummary {
            booking_id: self.booking.id,
            room_numbers: self.rooms.iter().map(|r| r.room.room_no).collect(),
            room_type: self.rooms.first().map(|r| r.room_type.category),
            check_in: self.booking.check_in,
            check_out: self.booking.check_out,
            status: self.booking.status,
        }
    }
}

/// One booking as presented to the model by the query tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub booking_id: BookingId,
    pub room_numbers: Vec<i32>,
    pub room_type: Option<RoomCategory>,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in RoomCategory::ALL {
            let parsed: RoomCategory = category.as_str().parse().expect("should parse");
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn category_match_is_case_sensitive() {
        let err = "deluxe".parse::<RoomCategory>().unwrap_err();
        assert_eq!(err.given, "deluxe");
    }

    #[test]
    fn valid_options_lists_all_categories() {
        assert_eq!(RoomCategory::valid_options(), "['Standard', 'Deluxe', 'Suite']");
    }

    #[test]
    fn category_serializes_as_canonical_name() {
        let json = serde_json::to_string(&RoomCategory::Suite).expect("serialize");
        assert_eq!(json, "\"Suite\"");
    }

    #[test]
    fn nights_are_calendar_days() {
        assert_eq!(nights_between(date("2030-06-01"), date("2030-06-04")), 3);
        assert_eq!(nights_between(date("2030-06-01"), date("2030-06-02")), 1);
    }

    #[test]
    fn overlap_is_strict_on_half_open_intervals() {
        let booking = Booking {
            id: BookingId::new(),
            user_id: UserId::new(),
            rooms: vec![RoomId::new()],
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        };

        // Shared boundary dates do not overlap.
        assert!(!booking.blocks_range(date("2030-06-12"), date("2030-06-14")));
        assert!(!booking.blocks_range(date("2030-06-08"), date("2030-06-10")));
        // Any interior intersection does.
        assert!(booking.blocks_range(date("2030-06-11"), date("2030-06-13")));
        assert!(booking.blocks_range(date("2030-06-09"), date("2030-06-11")));
        assert!(booking.blocks_range(date("2030-06-10"), date("2030-06-12")));
    }

    #[test]
    fn cancelled_booking_never_blocks() {
        let booking = Booking {
            id: BookingId::new(),
            user_id: UserId::new(),
            rooms: vec![RoomId::new()],
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            status: BookingStatus::Cancelled,
            created_at: Utc::now(),
        };

        assert!(!booking.blocks_range(date("2030-06-10"), date("2030-06-12")));
    }

    #[test]
    fn no_rooms_message_with_and_without_filter() {
        let with = NoRoomsAvailable { type_filter: Some("Deluxe".to_string()) };
        assert_eq!(
            with.to_string(),
            "No available rooms of type 'Deluxe' found for the specified dates"
        );

        let without = NoRoomsAvailable { type_filter: None };
        assert_eq!(without.to_string(), "No available rooms found for the specified dates");
    }

    #[test]
    fn room_listing_serializes_type_key() {
        let listing = RoomListing {
            room_id: RoomId::new(),
            room_no: 101,
            category: RoomCategory::Standard,
            description: "Cozy".to_string(),
            capacity: 2,
            cost_per_night: 100.0,
            total_cost: 300.0,
        };

        let value = serde_json::to_value(&listing).expect("serialize");
        assert_eq!(value["type"], "Standard");
        assert_eq!(value["room_no"], 101);
    }
}
