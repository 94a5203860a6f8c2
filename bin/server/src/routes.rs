//! HTTP surface of the assistant.
//!
//! Five endpoints: guest signup and login, opening a conversation,
//! reading its transcript, and the chat endpoint that runs the
//! conversation loop. Message bodies use the wire names `message` and
//! `toolsused` rather than the internal field names.

use crate::db::bookings::BookingRepository;
use crate::db::conversations::{ConversationRepository, MessageRepository};
use crate::db::users::UserRepository;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use concierge_conversation::{ConversationStore, Message, Orchestrator, Sender};
use concierge_core::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub struct AppState {
    pub users: UserRepository,
    pub conversations: ConversationRepository,
    pub messages: MessageRepository,
    pub orchestrator: Orchestrator<BookingRepository>,
}

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/conversations", post(create_conversation))
        .route(
            "/conversations/{conversation_id}/messages",
            get(conversation_messages),
        )
        .route("/chat", post(chat))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct UserResponse {
    id: UserId,
    email: String,
}

#[derive(Debug, Deserialize)]
struct CreateConversationRequest {
    user_id: UserId,
}

#[derive(Debug, Serialize)]
struct ConversationResponse {
    id: ConversationId,
    user_id: UserId,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    conversation_id: ConversationId,
    message: String,
    #[serde(default)]
    sender: Option<Sender>,
    #[serde(default)]
    toolsused: Option<Vec<String>>,
}

/// Stored message in its wire shape.
#[derive(Debug, Serialize)]
struct MessageResponse {
    id: MessageId,
    conversation_id: ConversationId,
    message: String,
    sender: Sender,
    toolsused: Option<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            message: message.content,
            sender: message.sender,
            toolsused: message.tools_used,
            created_at: message.created_at,
        }
    }
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let password_hash = hash_password(&request.password);
    let created = state
        .users
        .create(&request.email, &password_hash)
        .await
        .map_err(ApiError::internal)?;

    match created {
        Some(user) => Ok(Json(UserResponse {
            id: user.id,
            email: user.email,
        })),
        None => Err(ApiError::BadRequest {
            detail: "Email already registered".to_string(),
        }),
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_email(&request.email)
        .await
        .map_err(ApiError::internal)?;

    let Some(user) = user else {
        return Err(invalid_credentials());
    };
    if user.password_hash != hash_password(&request.password) {
        return Err(invalid_credentials());
    }

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
    }))
}

async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(request.user_id)
        .await
        .map_err(ApiError::internal)?;
    if user.is_none() {
        return Err(ApiError::NotFound {
            detail: "User not found".to_string(),
        });
    }

    let conversation = state
        .conversations
        .create(request.user_id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(ConversationResponse {
        id: conversation.id,
        user_id: conversation.user_id,
    }))
}

async fn conversation_messages(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<ConversationId>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    ensure_conversation_exists(&state, conversation_id).await?;

    let messages = state
        .messages
        .list(conversation_id)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Clients may echo sender/toolsused; the loop decides both itself.
    tracing::debug!(
        sender = ?request.sender,
        tools = ?request.toolsused,
        "chat request"
    );

    ensure_conversation_exists(&state, request.conversation_id).await?;

    let reply = state
        .orchestrator
        .handle_message(request.conversation_id, &request.message)
        .await
        .map_err(ApiError::internal)?;

    Ok(Json(MessageResponse::from(reply)))
}

async fn ensure_conversation_exists(
    state: &AppState,
    conversation_id: ConversationId,
) -> Result<(), ApiError> {
    let conversation = state
        .conversations
        .get(conversation_id)
        .await
        .map_err(ApiError::internal)?;

    if conversation.is_none() {
        return Err(ApiError::NotFound {
            detail: "Conversation not found".to_string(),
        });
    }
    Ok(())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized {
        detail: "Invalid credentials".to_string(),
    }
}

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_sha256_hex() {
        let hash = hash_password("secret");
        assert_eq!(
            hash,
            "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
        );
        assert_ne!(hash, hash_password("Secret"));
    }

    #[test]
    fn message_response_uses_wire_field_names() {
        let message = Message::new(
            ConversationId::new(),
            Sender::Ai,
            "Room booked.",
            Some(vec!["single_room_booking".to_string()]),
        );

        let value = serde_json::to_value(MessageResponse::from(message)).unwrap();
        assert!(value.get("message").is_some());
        assert!(value.get("toolsused").is_some());
        assert_eq!(value.get("sender").unwrap(), "AI");
        assert!(value.get("content").is_none());
    }

    #[test]
    fn chat_request_tolerates_missing_optional_fields() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"conversation_id": "conv_01ARZ3NDEKTSV4RRFFQ69G5FAV", "message": "Hi"}"#,
        )
        .unwrap();

        assert_eq!(request.message, "Hi");
        assert!(request.sender.is_none());
        assert!(request.toolsused.is_none());
    }
}
