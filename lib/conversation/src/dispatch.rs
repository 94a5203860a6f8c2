//! Executes validated tool requests against the booking domain.
//!
//! Every call builds its services over a fresh clone of the store, so one
//! call's failure cannot leave state behind that poisons the next. Domain
//! errors are folded into the `{"error": …}` payload the model reads;
//! dispatch itself never fails.

use crate::summary;
use crate::tool::ToolRequest;
use chrono::NaiveDate;
use concierge_booking::{
    AvailabilityOutcome, AvailabilityResolver, BookingError, BookingStore, BookingSummary,
    ConfirmationSender, ReservationService,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Result of one tool call, as handed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    /// JSON payload returned as the tool message content.
    pub payload: JsonValue,
    /// One-sentence recap, present on successful calls.
    pub summary: Option<String>,
}

impl ToolOutcome {
    /// Wraps an error message in the `{"error": …}` payload shape.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            payload: serde_json::json!({ "error": message.into() }),
            summary: None,
        }
    }

    /// Whether this outcome carries the error payload shape.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.payload.get("error").is_some()
    }

    fn encoded<T: Serialize>(value: &T, summary: String) -> Self {
        match serde_json::to_value(value) {
            Ok(payload) => Self { payload, summary: Some(summary) },
            Err(e) => Self::error(format!("Failed to encode tool result: {e}")),
        }
    }
}

/// Maps tool requests onto the availability resolver and reservation
/// service.
pub struct ToolDispatcher<S> {
    store: S,
    confirmations: Option<Arc<dyn ConfirmationSender>>,
}

impl<S: BookingStore + Clone> ToolDispatcher<S> {
    /// Creates a dispatcher over the given store, with confirmation
    /// delivery disabled.
    pub fn new(store: S) -> Self {
        Self { store, confirmations: None }
    }

    /// Enables booking confirmation delivery through the given sender.
    #[must_use]
    pub fn with_confirmation_sender(mut self, sender: Arc<dyn ConfirmationSender>) -> Self {
        self.confirmations = Some(sender);
        self
    }

    /// Runs one tool request, folding any domain error into the payload.
    pub async fn dispatch(&self, request: &ToolRequest, today: NaiveDate) -> ToolOutcome {
        tracing::debug!(tool = request.name(), "dispatching tool call");
        match request {
            ToolRequest::GetRoomTypes => self.room_types().await,
            ToolRequest::GetRooms { check_in, check_out, room_type } => {
                self.rooms(today, *check_in, *check_out, room_type.as_deref()).await
            }
            ToolRequest::SingleRoomBooking {
                email,
                room_type,
                check_in,
                check_out,
                room_number,
            } => self.book(today, email, room_type, *check_in, *check_out, *room_number).await,
            ToolRequest::GetUpcomingBookings { email } => {
                Self::booking_list(
                    "upcoming",
                    email,
                    self.reservations().upcoming_bookings(today, email).await,
                )
            }
            ToolRequest::GetPastBookings { email } => {
                Self::booking_list(
                    "past",
                    email,
                    self.reservations().past_bookings(today, email).await,
                )
            }
            ToolRequest::GetOngoingBookings { email } => {
                Self::booking_list(
                    "ongoing",
                    email,
                    self.reservations().ongoing_bookings(today, email).await,
                )
            }
            ToolRequest::UpdateBooking { booking_id, check_in, check_out, email } => {
                self.update(email, booking_id, *check_in, *check_out).await
            }
            ToolRequest::CancelBooking { booking_id, email } => {
                self.cancel(email, booking_id).await
            }
        }
    }

    fn resolver(&self) -> AvailabilityResolver<S> {
        AvailabilityResolver::new(self.store.clone())
    }

    fn reservations(&self) -> ReservationService<S> {
        let service = ReservationService::new(self.store.clone());
        match &self.confirmations {
            Some(sender) => service.with_confirmation_sender(Arc::clone(sender)),
            None => service,
        }
    }

    async fn room_types(&self) -> ToolOutcome {
        match self.resolver().room_types().await {
            Ok(listings) => ToolOutcome::encoded(&listings, summary::room_types(&listings)),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    async fn rooms(
        &self,
        today: NaiveDate,
        check_in: NaiveDate,
        check_out: NaiveDate,
        type_filter: Option<&str>,
    ) -> ToolOutcome {
        match self.resolver().find_available(today, check_in, check_out, type_filter).await {
            Ok(AvailabilityOutcome::Rooms(availability)) => {
                ToolOutcome::encoded(&availability, summary::availability(&availability))
            }
            // An empty result is conversational, not exceptional, but it
            // still rides the error payload shape so the model explains it.
            Ok(AvailabilityOutcome::NoneAvailable(none)) => ToolOutcome::error(none.to_string()),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    async fn book(
        &self,
        today: NaiveDate,
        email: &str,
        room_type: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_number: Option<i32>,
    ) -> ToolOutcome {
        let result = self
            .reservations()
            .book_room(today, email, room_type, check_in, check_out, room_number)
            .await;
        match result {
            Ok(confirmation) => match serde_json::to_value(&confirmation) {
                Ok(encoded) => ToolOutcome {
                    payload: serde_json::json!({
                        "success": true,
                        "booking_confirmation": encoded,
                    }),
                    summary: Some(summary::confirmation(&confirmation)),
                },
                Err(e) => ToolOutcome::error(format!("Failed to encode tool result: {e}")),
            },
            Err(BookingError::Store(e)) => {
                tracing::error!(error = %e, "error creating booking");
                ToolOutcome::error(format!("Failed to create booking: {e}"))
            }
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    async fn update(
        &self,
        email: &str,
        booking_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ToolOutcome {
        match self.reservations().update_booking(email, booking_id, check_in, check_out).await {
            Ok(row) => ToolOutcome::encoded(&row, summary::updated(&row)),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    async fn cancel(&self, email: &str, booking_id: &str) -> ToolOutcome {
        match self.reservations().cancel_booking(email, booking_id).await {
            Ok(row) => ToolOutcome::encoded(&row, summary::cancelled(&row)),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    fn booking_list(
        kind: &str,
        email: &str,
        result: Result<Vec<BookingSummary>, BookingError>,
    ) -> ToolOutcome {
        match result {
            Ok(list) => ToolOutcome::encoded(&list, summary::bookings(kind, email, &list)),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use concierge_booking::{
        BookingRecord, InMemoryBookingStore, ReserveOutcome, RoomCategory, RoomType, RoomWithType,
        StoreError, User,
    };
    use concierge_core::id::{BookingId, RoomId, UserId};
    use std::collections::HashSet;

    const GUEST: &str = "guest@example.com";

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    fn today() -> NaiveDate {
        date("2030-01-01")
    }

    async fn seeded_dispatcher() -> ToolDispatcher<InMemoryBookingStore> {
        let store = InMemoryBookingStore::new();
        let standard = store.add_room_type(RoomCategory::Standard, "Cozy room", 2, 100.0).await;
        let deluxe = store.add_room_type(RoomCategory::Deluxe, "Large room", 4, 150.0).await;
        store.add_room(101, standard.id).await;
        store.add_room(102, standard.id).await;
        store.add_room(201, deluxe.id).await;
        store.add_user(GUEST, "hash").await;
        ToolDispatcher::new(store)
    }

    fn book_request(room_type: &str, check_in: &str, check_out: &str) -> ToolRequest {
        ToolRequest::SingleRoomBooking {
            email: GUEST.to_string(),
            room_type: room_type.to_string(),
            check_in: date(check_in),
            check_out: date(check_out),
            room_number: None,
        }
    }

    #[tokio::test]
    async fn room_types_payload_lists_every_category() {
        let dispatcher = seeded_dispatcher().await;
        let outcome = dispatcher.dispatch(&ToolRequest::GetRoomTypes, today()).await;

        assert!(!outcome.is_error());
        let listings = outcome.payload.as_array().expect("array payload");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0]["type"], "Standard");
        assert_eq!(listings[0]["capacity"], 2);
        assert_eq!(listings[0]["cost"], 100.0);
        assert_eq!(listings[1]["type"], "Deluxe");
        assert!(outcome.summary.expect("summary").contains("Standard"));
    }

    #[tokio::test]
    async fn rooms_payload_carries_cost_and_range() {
        let dispatcher = seeded_dispatcher().await;
        let request = ToolRequest::GetRooms {
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            room_type: None,
        };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert!(!outcome.is_error());
        assert_eq!(outcome.payload["nights"], 2);
        assert_eq!(outcome.payload["check_in"], "2030-06-10");
        let rooms = outcome.payload["available_rooms"].as_array().expect("rooms");
        assert_eq!(rooms.len(), 3);
        assert_eq!(rooms[0]["room_no"], 101);
        assert_eq!(rooms[0]["total_cost"], 200.0);
    }

    #[tokio::test]
    async fn rooms_with_unknown_filter_is_an_error_payload() {
        let dispatcher = seeded_dispatcher().await;
        let request = ToolRequest::GetRooms {
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            room_type: Some("Penthouse".to_string()),
        };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert!(outcome.is_error());
        assert_eq!(
            outcome.payload["error"],
            "Invalid room type 'Penthouse'. Valid options are: ['Standard', 'Deluxe', 'Suite']"
        );
        assert_eq!(outcome.summary, None);
    }

    #[tokio::test]
    async fn fully_booked_filter_reports_no_rooms() {
        let dispatcher = seeded_dispatcher().await;
        let booked = dispatcher
            .dispatch(&book_request("Deluxe", "2030-06-10", "2030-06-12"), today())
            .await;
        assert!(!booked.is_error());

        let request = ToolRequest::GetRooms {
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            room_type: Some("Deluxe".to_string()),
        };
        let outcome = dispatcher.dispatch(&request, today()).await;
        assert_eq!(
            outcome.payload["error"],
            "No available rooms of type 'Deluxe' found for the specified dates"
        );
    }

    #[tokio::test]
    async fn booking_success_wraps_the_confirmation() {
        let dispatcher = seeded_dispatcher().await;
        let outcome = dispatcher
            .dispatch(&book_request("Standard", "2030-06-10", "2030-06-12"), today())
            .await;

        assert!(!outcome.is_error());
        assert_eq!(outcome.payload["success"], true);
        let confirmation = &outcome.payload["booking_confirmation"];
        assert_eq!(confirmation["room_number"], 101);
        assert_eq!(confirmation["room_type"], "Standard");
        assert_eq!(confirmation["guest_email"], GUEST);
        assert_eq!(confirmation["nights"], 2);
        assert_eq!(confirmation["total_cost"], 200.0);
        assert_eq!(confirmation["status"], "Booked");
        assert!(outcome.summary.expect("summary").starts_with("Booking confirmed!"));
    }

    #[tokio::test]
    async fn booking_past_dates_reports_the_validation_text() {
        let dispatcher = seeded_dispatcher().await;
        let outcome = dispatcher
            .dispatch(&book_request("Standard", "2020-01-01", "2020-01-03"), today())
            .await;

        assert_eq!(outcome.payload["error"], "Check-in date cannot be in the past");
    }

    #[tokio::test]
    async fn booking_the_last_room_twice_reports_none_left() {
        let dispatcher = seeded_dispatcher().await;
        dispatcher.dispatch(&book_request("Deluxe", "2030-06-10", "2030-06-12"), today()).await;
        let outcome = dispatcher
            .dispatch(&book_request("Deluxe", "2030-06-11", "2030-06-13"), today())
            .await;

        assert_eq!(
            outcome.payload["error"],
            "No available Deluxe rooms found for the specified dates"
        );
    }

    #[tokio::test]
    async fn upcoming_bookings_round_trip() {
        let dispatcher = seeded_dispatcher().await;
        dispatcher.dispatch(&book_request("Standard", "2030-06-10", "2030-06-12"), today()).await;

        let request = ToolRequest::GetUpcomingBookings { email: GUEST.to_string() };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert!(!outcome.is_error());
        let list = outcome.payload.as_array().expect("array payload");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["room_numbers"], serde_json::json!([101]));
        assert_eq!(list[0]["check_in"], "2030-06-10");
        assert!(outcome.summary.expect("summary").contains(GUEST));
    }

    #[tokio::test]
    async fn queries_for_unknown_user_report_not_found() {
        let dispatcher = seeded_dispatcher().await;
        let request =
            ToolRequest::GetOngoingBookings { email: "stranger@example.com".to_string() };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert_eq!(
            outcome.payload["error"],
            "User with email stranger@example.com not found"
        );
    }

    #[tokio::test]
    async fn empty_query_result_is_a_success_with_empty_array() {
        let dispatcher = seeded_dispatcher().await;
        let request = ToolRequest::GetPastBookings { email: GUEST.to_string() };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert!(!outcome.is_error());
        assert_eq!(outcome.payload, serde_json::json!([]));
        assert_eq!(
            outcome.summary.expect("summary"),
            format!("No past bookings found for {GUEST}.")
        );
    }

    #[tokio::test]
    async fn update_rewrites_the_dates() {
        let dispatcher = seeded_dispatcher().await;
        let booked = dispatcher
            .dispatch(&book_request("Standard", "2030-06-10", "2030-06-12"), today())
            .await;
        let id = booked.payload["booking_confirmation"]["booking_id"]
            .as_str()
            .expect("booking id")
            .to_string();

        let request = ToolRequest::UpdateBooking {
            booking_id: id.clone(),
            check_in: date("2030-07-01"),
            check_out: date("2030-07-04"),
            email: GUEST.to_string(),
        };
        let outcome = dispatcher.dispatch(&request, today()).await;

        assert!(!outcome.is_error());
        assert_eq!(outcome.payload["check_in"], "2030-07-01");
        assert_eq!(outcome.payload["check_out"], "2030-07-04");
        assert!(outcome.summary.expect("summary").contains("updated"));
    }

    #[tokio::test]
    async fn cancel_then_cancel_again() {
        let dispatcher = seeded_dispatcher().await;
        let booked = dispatcher
            .dispatch(&book_request("Standard", "2030-06-10", "2030-06-12"), today())
            .await;
        let id = booked.payload["booking_confirmation"]["booking_id"]
            .as_str()
            .expect("booking id")
            .to_string();
        let request =
            ToolRequest::CancelBooking { booking_id: id.clone(), email: GUEST.to_string() };

        let first = dispatcher.dispatch(&request, today()).await;
        assert!(!first.is_error());
        assert_eq!(first.payload["status"], "Cancelled");

        let second = dispatcher.dispatch(&request, today()).await;
        assert_eq!(second.payload["error"], format!("Booking {id} is already cancelled"));
    }

    #[derive(Clone)]
    struct FailingStore;

    impl FailingStore {
        fn err() -> StoreError {
            StoreError::Unavailable { reason: "pool exhausted".to_string() }
        }
    }

    #[async_trait]
    impl BookingStore for FailingStore {
        async fn room_types(&self) -> Result<Vec<RoomType>, StoreError> {
            Err(Self::err())
        }

        async fn rooms_by_category(
            &self,
            _category: Option<RoomCategory>,
        ) -> Result<Vec<RoomWithType>, StoreError> {
            Err(Self::err())
        }

        async fn blocked_room_ids(
            &self,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
        ) -> Result<HashSet<RoomId>, StoreError> {
            Err(Self::err())
        }

        async fn user_by_email(&self, _email: &str) -> Result<Option<User>, StoreError> {
            Err(Self::err())
        }

        async fn reserve_room(
            &self,
            _user_id: UserId,
            _room_id: RoomId,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
        ) -> Result<ReserveOutcome, StoreError> {
            Err(Self::err())
        }

        async fn bookings_for_user(
            &self,
            _user_id: UserId,
        ) -> Result<Vec<BookingRecord>, StoreError> {
            Err(Self::err())
        }

        async fn booking_for_user(
            &self,
            _booking_id: BookingId,
            _user_id: UserId,
        ) -> Result<Option<BookingRecord>, StoreError> {
            Err(Self::err())
        }

        async fn holds_booking_for_dates(
            &self,
            _user_id: UserId,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
        ) -> Result<bool, StoreError> {
            Err(Self::err())
        }

        async fn update_booking_dates(
            &self,
            _booking_id: BookingId,
            _check_in: NaiveDate,
            _check_out: NaiveDate,
        ) -> Result<BookingRecord, StoreError> {
            Err(Self::err())
        }

        async fn cancel_booking(&self, _booking_id: BookingId) -> Result<BookingRecord, StoreError> {
            Err(Self::err())
        }
    }

    #[tokio::test]
    async fn store_failure_during_booking_uses_the_create_error_text() {
        let dispatcher = ToolDispatcher::new(FailingStore);
        let outcome = dispatcher
            .dispatch(&book_request("Standard", "2030-06-10", "2030-06-12"), today())
            .await;

        assert_eq!(
            outcome.payload["error"],
            "Failed to create booking: storage unavailable: pool exhausted"
        );
    }

    #[tokio::test]
    async fn store_failure_during_query_surfaces_the_store_text() {
        let dispatcher = ToolDispatcher::new(FailingStore);
        let outcome = dispatcher.dispatch(&ToolRequest::GetRoomTypes, today()).await;

        assert_eq!(outcome.payload["error"], "storage unavailable: pool exhausted");
    }
}
