//! Booking domain for the concierge platform.
//!
//! This crate provides:
//!
//! - **Availability Resolver**: Room and room-type lookup for a date range
//! - **Reservation Service**: Booking creation, modification, and cancellation
//! - **Booking Store**: Persistence trait with an in-memory implementation

pub mod availability;
pub mod confirm;
pub mod error;
pub mod memory;
pub mod model;
pub mod reservation;
pub mod store;

pub use availability::AvailabilityResolver;
pub use confirm::{ConfirmationError, ConfirmationSender};
pub use error::{BookingError, ConflictError, NotFoundError, StoreError, ValidationError};
pub use memory::InMemoryBookingStore;
pub use model::{
    Availability, AvailabilityOutcome, Booking, BookingConfirmation, BookingRecord, BookingStatus,
    BookingSummary, NoRoomsAvailable, Room, RoomCategory, RoomListing, RoomType, RoomTypeListing,
    RoomWithType, User, nights_between,
};
pub use reservation::ReservationService;
pub use store::{BookingStore, ReserveOutcome};
