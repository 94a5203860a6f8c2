//! Plain-text recaps of tool results.
//!
//! Each successful tool call feeds the model two things: the raw JSON
//! payload and a short sentence restating it. The sentence keeps the model
//! anchored to what actually happened, which matters once the payload
//! scrolls deep into the context.

use concierge_booking::{Availability, BookingConfirmation, BookingSummary, RoomTypeListing};

pub(crate) fn room_types(listings: &[RoomTypeListing]) -> String {
    if listings.is_empty() {
        return "No room types are configured.".to_string();
    }
    let parts: Vec<String> = listings
        .iter()
        .map(|l| format!("{} (sleeps {}, ${:.2}/night)", l.category, l.capacity, l.cost))
        .collect();
    format!("Available room types: {}.", parts.join(", "))
}

pub(crate) fn availability(availability: &Availability) -> String {
    let rooms: Vec<String> = availability
        .available_rooms
        .iter()
        .map(|r| {
            format!(
                "Room {} ({}, ${:.2}/night, ${:.2} total)",
                r.room_no, r.category, r.cost_per_night, r.total_cost
            )
        })
        .collect();
    format!(
        "{} room(s) available from {} to {} for {} night(s): {}.",
        availability.available_rooms.len(),
        availability.check_in,
        availability.check_out,
        availability.nights,
        rooms.join(", ")
    )
}

pub(crate) fn confirmation(confirmation: &BookingConfirmation) -> String {
    format!(
        "Booking confirmed! Booking ID: {}. Room {} ({}) from {} to {}, \
         {} night(s), total ${:.2}. A confirmation email has been sent to {}.",
        confirmation.booking_id,
        confirmation.room_number,
        confirmation.room_type,
        confirmation.check_in,
        confirmation.check_out,
        confirmation.nights,
        confirmation.total_cost,
        confirmation.guest_email
    )
}

pub(crate) fn bookings(kind: &str, email: &str, list: &[BookingSummary]) -> String {
    if list.is_empty() {
        return format!("No {kind} bookings found for {email}.");
    }
    let parts: Vec<String> = list.iter().map(one_booking).collect();
    format!("{} {kind} booking(s) for {email}: {}.", list.len(), parts.join("; "))
}

pub(crate) fn updated(summary: &BookingSummary) -> String {
    format!(
        "Booking {} updated: now from {} to {} ({}).",
        summary.booking_id, summary.check_in, summary.check_out, summary.status
    )
}

pub(crate) fn cancelled(summary: &BookingSummary) -> String {
    format!(
        "Booking {} from {} to {} has been cancelled.",
        summary.booking_id, summary.check_in, summary.check_out
    )
}

fn one_booking(summary: &BookingSummary) -> String {
    let rooms: Vec<String> = summary.room_numbers.iter().map(ToString::to_string).collect();
    format!(
        "{} (room(s) {} from {} to {}, {})",
        summary.booking_id,
        rooms.join(", "),
        summary.check_in,
        summary.check_out,
        summary.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use concierge_booking::{BookingStatus, RoomCategory};
    use concierge_core::id::{BookingId, RoomTypeId};

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    #[test]
    fn room_types_lists_each_category_once() {
        let listings = vec![
            RoomTypeListing {
                id: RoomTypeId::new(),
                category: RoomCategory::Standard,
                description: "Cozy room".to_string(),
                capacity: 2,
                cost: 100.0,
            },
            RoomTypeListing {
                id: RoomTypeId::new(),
                category: RoomCategory::Suite,
                description: "Top floor".to_string(),
                capacity: 6,
                cost: 300.0,
            },
        ];

        let text = room_types(&listings);
        assert_eq!(
            text,
            "Available room types: Standard (sleeps 2, $100.00/night), \
             Suite (sleeps 6, $300.00/night)."
        );
    }

    #[test]
    fn confirmation_carries_id_and_email() {
        let id = BookingId::new();
        let text = confirmation(&BookingConfirmation {
            booking_id: id,
            guest_email: "guest@example.com".to_string(),
            room_number: 102,
            room_type: RoomCategory::Standard,
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            nights: 2,
            cost_per_night: 100.0,
            total_cost: 200.0,
            status: BookingStatus::Booked,
            booking_date: Utc::now(),
        });

        assert!(text.starts_with(&format!("Booking confirmed! Booking ID: {id}.")));
        assert!(text.contains("Room 102 (Standard) from 2030-06-10 to 2030-06-12"));
        assert!(text.ends_with("A confirmation email has been sent to guest@example.com."));
    }

    #[test]
    fn empty_booking_list_reads_as_none_found() {
        let text = bookings("upcoming", "guest@example.com", &[]);
        assert_eq!(text, "No upcoming bookings found for guest@example.com.");
    }

    #[test]
    fn booking_list_counts_and_enumerates() {
        let first = BookingSummary {
            booking_id: BookingId::new(),
            room_numbers: vec![101],
            room_type: Some(RoomCategory::Standard),
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            status: BookingStatus::Booked,
        };
        let second = BookingSummary {
            booking_id: BookingId::new(),
            room_numbers: vec![201],
            room_type: Some(RoomCategory::Deluxe),
            check_in: date("2030-07-01"),
            check_out: date("2030-07-04"),
            status: BookingStatus::Cancelled,
        };

        let text = bookings("upcoming", "guest@example.com", &[first.clone(), second]);
        assert!(text.starts_with("2 upcoming booking(s) for guest@example.com: "));
        assert!(text.contains(&format!("{} (room(s) 101 from 2030-06-10 to 2030-06-12, Booked)",
            first.booking_id)));
        assert!(text.contains("Cancelled"));
    }

    #[test]
    fn cancellation_text_names_the_range() {
        let id = BookingId::new();
        let text = cancelled(&BookingSummary {
            booking_id: id,
            room_numbers: vec![101],
            room_type: Some(RoomCategory::Standard),
            check_in: date("2030-06-10"),
            check_out: date("2030-06-12"),
            status: BookingStatus::Cancelled,
        });
        assert_eq!(text, format!("Booking {id} from 2030-06-10 to 2030-06-12 has been cancelled."));
    }
}
