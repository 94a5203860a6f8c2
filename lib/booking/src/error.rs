//! Error types for the booking domain.
//!
//! Every variant that can reach the model carries its exact user-facing
//! message in its `Display` impl; the conversation layer serializes that
//! text into the `{"error": …}` payload without rewording it.

use crate::model::RoomCategory;
use std::fmt;

/// Rejected input: bad dates or an unknown room category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Check-in is on or after check-out.
    InvalidRange,
    /// Check-in is before the current date.
    PastDate,
    /// A date argument did not parse as an ISO calendar date.
    BadDateFormat {
        /// Parser detail, appended to the message.
        detail: String,
    },
    /// The category is not one of the enumerated values.
    InvalidCategory {
        /// The rejected input, echoed back verbatim.
        given: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidRange => {
                write!(f, "Check-in date must be before check-out date")
            }
            ValidationError::PastDate => write!(f, "Check-in date cannot be in the past"),
            ValidationError::BadDateFormat { detail } => {
                write!(f, "Invalid date format. Use YYYY-MM-DD. Error: {detail}")
            }
            ValidationError::InvalidCategory { given } => {
                write!(
                    f,
                    "Invalid room type '{given}'. Valid options are: {}",
                    RoomCategory::valid_options()
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A referenced entity does not exist, or no room matches the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// No registered user with this email.
    User { email: String },
    /// No booking with this id belonging to this user.
    Booking { id: String, email: String },
    /// No free room of the requested type for the range.
    NoRoomsOfType {
        /// The raw category string the caller supplied.
        given: String,
    },
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::User { email } => {
                write!(f, "User with email {email} not found")
            }
            NotFoundError::Booking { id, email } => {
                write!(f, "Booking {id} not found for user {email}")
            }
            NotFoundError::NoRoomsOfType { given } => {
                write!(f, "No available {given} rooms found for the specified dates")
            }
        }
    }
}

impl std::error::Error for NotFoundError {}

/// The request collides with existing booking state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    /// The requested room is taken for the range.
    RoomUnavailable { room_number: i32 },
    /// The user already holds a non-cancelled booking for these exact dates.
    DuplicateBooking,
    /// The booking was cancelled earlier; cancellation is irreversible.
    AlreadyCancelled { id: String },
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::RoomUnavailable { room_number } => {
                write!(f, "Room {room_number} is not available for the specified dates")
            }
            ConflictError::DuplicateBooking => {
                write!(f, "You already have a booking for these dates")
            }
            ConflictError::AlreadyCancelled { id } => {
                write!(f, "Booking {id} is already cancelled")
            }
        }
    }
}

impl std::error::Error for ConflictError {}

/// Storage-layer failure, independent of request validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or a handle could not be acquired.
    Unavailable { reason: String },
    /// A query or mutation failed.
    Query { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable { reason } => write!(f, "storage unavailable: {reason}"),
            StoreError::Query { reason } => write!(f, "storage query failed: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Umbrella error for booking operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    Validation(ValidationError),
    NotFound(NotFoundError),
    Conflict(ConflictError),
    Store(StoreError),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::Validation(e) => e.fmt(f),
            BookingError::NotFound(e) => e.fmt(f),
            BookingError::Conflict(e) => e.fmt(f),
            BookingError::Store(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for BookingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BookingError::Validation(e) => Some(e),
            BookingError::NotFound(e) => Some(e),
            BookingError::Conflict(e) => Some(e),
            BookingError::Store(e) => Some(e),
        }
    }
}

impl From<ValidationError> for BookingError {
    fn from(e: ValidationError) -> Self {
        BookingError::Validation(e)
    }
}

impl From<NotFoundError> for BookingError {
    fn from(e: NotFoundError) -> Self {
        BookingError::NotFound(e)
    }
}

impl From<ConflictError> for BookingError {
    fn from(e: ConflictError) -> Self {
        BookingError::Conflict(e)
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        BookingError::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_wire_text() {
        assert_eq!(
            ValidationError::InvalidRange.to_string(),
            "Check-in date must be before check-out date"
        );
        assert_eq!(
            ValidationError::PastDate.to_string(),
            "Check-in date cannot be in the past"
        );
        assert_eq!(
            ValidationError::BadDateFormat { detail: "bad day".to_string() }.to_string(),
            "Invalid date format. Use YYYY-MM-DD. Error: bad day"
        );
        assert_eq!(
            ValidationError::InvalidCategory { given: "Penthouse".to_string() }.to_string(),
            "Invalid room type 'Penthouse'. Valid options are: ['Standard', 'Deluxe', 'Suite']"
        );
    }

    #[test]
    fn not_found_messages_match_wire_text() {
        assert_eq!(
            NotFoundError::User { email: "a@b.c".to_string() }.to_string(),
            "User with email a@b.c not found"
        );
        assert_eq!(
            NotFoundError::Booking { id: "bkg_x".to_string(), email: "a@b.c".to_string() }
                .to_string(),
            "Booking bkg_x not found for user a@b.c"
        );
        assert_eq!(
            NotFoundError::NoRoomsOfType { given: "Deluxe".to_string() }.to_string(),
            "No available Deluxe rooms found for the specified dates"
        );
    }

    #[test]
    fn conflict_messages_match_wire_text() {
        assert_eq!(
            ConflictError::RoomUnavailable { room_number: 204 }.to_string(),
            "Room 204 is not available for the specified dates"
        );
        assert_eq!(
            ConflictError::DuplicateBooking.to_string(),
            "You already have a booking for these dates"
        );
        assert_eq!(
            ConflictError::AlreadyCancelled { id: "bkg_x".to_string() }.to_string(),
            "Booking bkg_x is already cancelled"
        );
    }

    #[test]
    fn umbrella_error_delegates_display() {
        let err: BookingError = ValidationError::PastDate.into();
        assert_eq!(err.to_string(), "Check-in date cannot be in the past");

        let err: BookingError =
            StoreError::Unavailable { reason: "pool exhausted".to_string() }.into();
        assert_eq!(err.to_string(), "storage unavailable: pool exhausted");
    }
}
