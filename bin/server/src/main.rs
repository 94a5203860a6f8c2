//! Server entry point for the concierge hotel assistant.

mod config;
mod db;
mod error;
mod routes;

use crate::config::ServerConfig;
use crate::db::bookings::BookingRepository;
use crate::db::conversations::{ConversationRepository, MessageRepository};
use crate::db::users::UserRepository;
use crate::routes::AppState;
use concierge_ai::OpenAiBackend;
use concierge_conversation::{Orchestrator, ToolDispatcher};
use concierge_memory::VectorMemory;
use concierge_notify::SmtpMailer;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    // Create database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    // One backend serves chat and embeddings
    let backend = Arc::new(OpenAiBackend::new(config.llm.clone()));
    let memory = Arc::new(VectorMemory::new(backend.clone()));

    let bookings = BookingRepository::new(db_pool.clone());
    let mut dispatcher = ToolDispatcher::new(bookings);
    match &config.smtp {
        Some(smtp) => {
            let mailer = SmtpMailer::new(smtp).expect("failed to build SMTP transport");
            dispatcher = dispatcher.with_confirmation_sender(Arc::new(mailer));
        }
        None => {
            tracing::warn!("SMTP not configured; booking confirmations will not be emailed");
        }
    }

    let messages = MessageRepository::new(db_pool.clone());
    let orchestrator = Orchestrator::new(
        backend,
        Arc::new(messages.clone()),
        memory,
        dispatcher,
    )
    .with_config(config.assistant.clone());

    let app_state = Arc::new(AppState {
        users: UserRepository::new(db_pool.clone()),
        conversations: ConversationRepository::new(db_pool),
        messages,
        orchestrator,
    });

    let app = routes::router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
