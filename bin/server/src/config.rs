//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`LlmConfig`](concierge_ai::LlmConfig) for model backend
//! configuration and [`SmtpConfig`](concierge_notify::SmtpConfig) for
//! confirmation email delivery.

use concierge_ai::LlmConfig;
use concierge_conversation::AssistantConfig;
use concierge_notify::SmtpConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address and port the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Model backend configuration.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Conversation loop tunables.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// SMTP delivery for booking confirmations.
    /// When absent, confirmations are skipped and bookings still succeed.
    pub smtp: Option<SmtpConfig>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
