//! Booking confirmation delivery for the concierge platform.
//!
//! Confirmation emails are sent over SMTP in the background of the booking
//! flow; a delivery failure is reported to the caller and never blocks the
//! booking itself.

mod error;
mod mailer;

pub use error::NotifyError;
pub use mailer::{SmtpConfig, SmtpMailer};
