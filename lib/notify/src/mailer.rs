//! SMTP delivery of booking confirmation emails.

use crate::error::NotifyError;
use async_trait::async_trait;
use concierge_booking::{BookingConfirmation, ConfirmationError, ConfirmationSender};
use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rootcause::prelude::Report;
use serde::Deserialize;
use tracing::{info, instrument};

/// SMTP relay settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Relay hostname.
    pub host: String,
    /// Submission port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Relay username.
    pub username: String,
    /// Relay password.
    pub password: String,
    /// From address on outgoing mail.
    pub from: String,
}

fn default_port() -> u16 {
    587
}

/// Sends booking confirmations through an SMTP relay over STARTTLS.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    /// Creates a mailer for the given relay settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay hostname cannot be used to build a
    /// transport.
    pub fn new(config: &SmtpConfig) -> Result<Self, Report<NotifyError>> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| NotifyError::InvalidTransport {
                details: e.to_string(),
            })?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }

    #[instrument(skip(self, confirmation), fields(to = %confirmation.guest_email))]
    async fn deliver(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), Report<NotifyError>> {
        let message = build_message(&self.from, confirmation)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::SendFailed {
                details: e.to_string(),
            })?;

        info!("sent booking confirmation email");
        Ok(())
    }
}

#[async_trait]
impl ConfirmationSender for SmtpMailer {
    async fn send_confirmation(
        &self,
        confirmation: &BookingConfirmation,
    ) -> Result<(), ConfirmationError> {
        self.deliver(confirmation).await.map_err(|e| ConfirmationError {
            reason: e.to_string(),
        })
    }
}

fn build_message(
    from: &str,
    confirmation: &BookingConfirmation,
) -> Result<Message, NotifyError> {
    let from: Mailbox = from.parse().map_err(|e: AddressError| NotifyError::InvalidMessage {
        details: e.to_string(),
    })?;
    let to: Mailbox = confirmation.guest_email.parse().map_err(|e: AddressError| {
        NotifyError::InvalidMessage {
            details: e.to_string(),
        }
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject("Your hotel booking confirmation")
        .header(ContentType::TEXT_PLAIN)
        .body(body(confirmation))
        .map_err(|e| NotifyError::InvalidMessage {
            details: e.to_string(),
        })
}

fn body(confirmation: &BookingConfirmation) -> String {
    format!(
        "Dear guest,\n\n\
         Your booking is confirmed.\n\n\
         Booking ID: {}\n\
         Room: {} ({})\n\
         Check-in: {}\n\
         Check-out: {}\n\
         Nights: {}\n\
         Cost per night: ${:.2}\n\
         Total cost: ${:.2}\n\n\
         We look forward to welcoming you.\n",
        confirmation.booking_id,
        confirmation.room_number,
        confirmation.room_type,
        confirmation.check_in,
        confirmation.check_out,
        confirmation.nights,
        confirmation.cost_per_night,
        confirmation.total_cost,
    )
}
