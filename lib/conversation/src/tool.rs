//! Booking tools offered to the model.
//!
//! The tool surface is a closed set: every request the model can make
//! parses into a [`ToolRequest`] variant with a validated argument shape,
//! and the registry publishes the matching declarations.

use crate::error::ToolError;
use chrono::NaiveDate;
use concierge_ai::ToolSpec;
use serde_json::Value as JsonValue;

/// A validated tool invocation, ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// List all room types.
    GetRoomTypes,
    /// List available rooms for a date range, optionally filtered by type.
    GetRooms {
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: Option<String>,
    },
    /// Book one room for a guest.
    SingleRoomBooking {
        email: String,
        room_type: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_number: Option<i32>,
    },
    /// List a guest's bookings with check-in after today.
    GetUpcomingBookings { email: String },
    /// List a guest's bookings with check-out before today.
    GetPastBookings { email: String },
    /// List a guest's bookings covering today.
    GetOngoingBookings { email: String },
    /// Move a booking to new dates.
    UpdateBooking {
        booking_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
        email: String,
    },
    /// Cancel a booking.
    CancelBooking { booking_id: String, email: String },
}

impl ToolRequest {
    /// Parses a named tool call with its raw JSON argument text.
    ///
    /// Argument objects double-encoded as JSON strings are unwrapped, and a
    /// room number argument is accepted as an integer, a float, or a numeric
    /// string. Category and booking-id values are kept verbatim so their
    /// validation errors carry the caller's exact input.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown tool names, malformed argument objects,
    /// or dates that do not parse.
    pub fn parse(name: &str, arguments: &str) -> Result<Self, ToolError> {
        match name {
            "getRoomTypes" => Ok(Self::GetRoomTypes),
            "getRooms" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::GetRooms {
                    check_in: args.required_date("check_in")?,
                    check_out: args.required_date("check_out")?,
                    room_type: args.optional_str("room_type"),
                })
            }
            "single_room_booking" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::SingleRoomBooking {
                    email: args.required_str("email")?,
                    room_type: args.required_str("room_type")?,
                    check_in: args.required_date("check_in")?,
                    check_out: args.required_date("check_out")?,
                    room_number: args.room_number("room_number"),
                })
            }
            "get_upcoming_bookings" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::GetUpcomingBookings {
                    email: args.required_str("email")?,
                })
            }
            "get_past_bookings" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::GetPastBookings {
                    email: args.required_str("email")?,
                })
            }
            "get_ongoing_bookings" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::GetOngoingBookings {
                    email: args.required_str("email")?,
                })
            }
            "update_booking" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::UpdateBooking {
                    booking_id: args.required_str("booking_id")?,
                    check_in: args.required_date("check_in")?,
                    check_out: args.required_date("check_out")?,
                    email: args.required_str("email")?,
                })
            }
            "cancel_booking" => {
                let args = Arguments::parse(arguments)?;
                Ok(Self::CancelBooking {
                    booking_id: args.required_str("booking_id")?,
                    email: args.required_str("email")?,
                })
            }
            other => Err(ToolError::NotFound {
                name: other.to_string(),
            }),
        }
    }

    /// The wire name of the tool this request addresses.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetRoomTypes => "getRoomTypes",
            Self::GetRooms { .. } => "getRooms",
            Self::SingleRoomBooking { .. } => "single_room_booking",
            Self::GetUpcomingBookings { .. } => "get_upcoming_bookings",
            Self::GetPastBookings { .. } => "get_past_bookings",
            Self::GetOngoingBookings { .. } => "get_ongoing_bookings",
            Self::UpdateBooking { .. } => "update_booking",
            Self::CancelBooking { .. } => "cancel_booking",
        }
    }
}

/// Parsed tool argument object with tolerant accessors.
struct Arguments(serde_json::Map<String, JsonValue>);

impl Arguments {
    fn parse(raw: &str) -> Result<Self, ToolError> {
        let value: JsonValue =
            serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
                reason: format!("arguments are not valid JSON: {e}"),
            })?;
        // Models sometimes double-encode the argument object as a string.
        let value = match value {
            JsonValue::String(inner) => {
                serde_json::from_str(&inner).map_err(|e| ToolError::InvalidArguments {
                    reason: format!("arguments are not valid JSON: {e}"),
                })?
            }
            other => other,
        };
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(ToolError::InvalidArguments {
                reason: format!("expected an argument object, got {other}"),
            }),
        }
    }

    fn required_str(&self, key: &str) -> Result<String, ToolError> {
        match self.0.get(key) {
            None | Some(JsonValue::Null) => Err(ToolError::InvalidArguments {
                reason: format!("missing required argument '{key}'"),
            }),
            Some(JsonValue::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
        }
    }

    fn optional_str(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) if s.is_empty() => None,
            Some(JsonValue::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    fn required_date(&self, key: &str) -> Result<NaiveDate, ToolError> {
        let raw = self.required_str(key)?;
        raw.parse::<NaiveDate>().map_err(|e| ToolError::InvalidDate {
            detail: format!("{e}: '{raw}'"),
        })
    }

    /// Room numbers arrive as integers, floats, or numeric strings; anything
    /// else falls back to the pick-any-room path. Zero counts as absent.
    fn room_number(&self, key: &str) -> Option<i32> {
        let number = match self.0.get(key) {
            Some(JsonValue::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    i32::try_from(i).ok()
                } else {
                    n.as_f64().map(|f| f as i32)
                }
            }
            Some(JsonValue::String(s)) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<i32>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as i32))
            }
            _ => None,
        };
        number.filter(|&n| n != 0)
    }
}

/// Registry of the tools the model may address.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    /// The built-in booking tool set, in stable declaration order.
    #[must_use]
    pub fn builtin() -> Self {
        let date = |description: &str| {
            serde_json::json!({
                "type": "string",
                "description": format!("{description} in YYYY-MM-DD format"),
            })
        };
        let email = serde_json::json!({
            "type": "string",
            "description": "The guest's email address",
        });
        let booking_id = serde_json::json!({
            "type": "string",
            "description": "The booking id to operate on",
        });

        let specs = vec![
            ToolSpec::new(
                "getRoomTypes",
                "Get all room types provided by the hotel with their \
                 description, capacity, and nightly cost.",
                serde_json::json!({
                    "type": "object",
                    "properties": {},
                    "required": [],
                }),
            ),
            ToolSpec::new(
                "getRooms",
                "Get available rooms between check-in and check-out dates, \
                 optionally filtered by room type (Standard, Deluxe, Suite).",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "check_in": date("Check-in date"),
                        "check_out": date("Check-out date"),
                        "room_type": {
                            "type": "string",
                            "description": "Optional room type filter: Standard, Deluxe, or Suite",
                        },
                    },
                    "required": ["check_in", "check_out"],
                }),
            ),
            ToolSpec::new(
                "single_room_booking",
                "Book a single room between check-in and check-out dates. \
                 With room_number set, books that exact room; otherwise books \
                 any available room of the requested type.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "email": email,
                        "room_type": {
                            "type": "string",
                            "description": "Room type to book: Standard, Deluxe, or Suite",
                        },
                        "check_in": date("Check-in date"),
                        "check_out": date("Check-out date"),
                        "room_number": {
                            "type": "integer",
                            "description": "Optional specific room number to book",
                        },
                    },
                    "required": ["email", "room_type", "check_in", "check_out"],
                }),
            ),
            ToolSpec::new(
                "get_upcoming_bookings",
                "List the guest's bookings whose check-in is after today.",
                email_only_schema(&email),
            ),
            ToolSpec::new(
                "get_past_bookings",
                "List the guest's bookings whose check-out is before today.",
                email_only_schema(&email),
            ),
            ToolSpec::new(
                "get_ongoing_bookings",
                "List the guest's bookings whose stay covers today.",
                email_only_schema(&email),
            ),
            ToolSpec::new(
                "update_booking",
                "Change the check-in and check-out dates of an existing booking.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "booking_id": booking_id,
                        "check_in": date("New check-in date"),
                        "check_out": date("New check-out date"),
                        "email": email,
                    },
                    "required": ["booking_id", "check_in", "check_out", "email"],
                }),
            ),
            ToolSpec::new(
                "cancel_booking",
                "Cancel an existing booking. This cannot be undone.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "booking_id": booking_id,
                        "email": email,
                    },
                    "required": ["booking_id", "email"],
                }),
            ),
        ];
        Self { specs }
    }

    /// The declarations, in stable order.
    #[must_use]
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    /// Whether a tool with the given wire name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.specs.iter().any(|spec| spec.name == name)
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

fn email_only_schema(email: &JsonValue) -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": { "email": email },
        "required": ["email"],
    })
}
