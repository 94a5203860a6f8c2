//! The conversation loop: one guest message in, one assistant reply out.
//!
//! Each exchange loads recent history, runs the model with the booking
//! tools on offer, executes whatever tools it requests, and persists the
//! whole transcript, tool activity included. Failures inside a round
//! collapse into a fixed apology so the guest always gets a reply; only
//! storage failures around the loop surface to the caller.

use crate::dispatch::{ToolDispatcher, ToolOutcome};
use crate::error::OrchestrationError;
use crate::message::{Message, MessageStore, Sender};
use crate::tool::{ToolRegistry, ToolRequest};
use chrono::{Datelike, NaiveDate, Utc};
use concierge_ai::{ChatMessage, LlmBackend, LlmError, PromptTemplate, ToolCall};
use concierge_booking::BookingStore;
use concierge_core::ConversationId;
use concierge_memory::ConversationMemory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Instructions pinned at the head of every model conversation.
const SYSTEM_PROMPT: &str = "\
You are a friendly and professional booking assistant for a hotel.

Today's date is {{today}}. When a guest gives a date without a year, assume \
{{current_year}}, or the following year if that date has already passed. \
Dates passed to tools must use the YYYY-MM-DD format.

The hotel offers three room types: Standard sleeps 2 guests, Deluxe sleeps 4, \
and Suite sleeps 6. Suggest the smallest type that fits the party unless the \
guest asks for something else.

You must have the guest's email address before creating, updating, or \
cancelling a booking; ask for it if you do not. Restate the dates, room type, \
and total price and get the guest's confirmation before you book. Use the \
tools for every question about availability, prices, or bookings instead of \
guessing. When a tool reports an error, explain it in plain language and \
suggest what the guest can do next.";

/// Reply used when the model produces only whitespace.
const DEFAULT_GREETING: &str = "Hello! How can I assist you with your hotel booking today?";

/// Reply used when a round fails outright.
const APOLOGY: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Tunables for the conversation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Model rounds that may request tools before the forced tool-free
    /// wrap-up call.
    pub max_tool_rounds: usize,
    /// Number of prior messages replayed into the model context.
    pub history_limit: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self { max_tool_rounds: 3, history_limit: 50 }
    }
}

/// Drives guest conversations against the model and the booking domain.
pub struct Orchestrator<S> {
    backend: Arc<dyn LlmBackend>,
    messages: Arc<dyn MessageStore>,
    memory: Arc<dyn ConversationMemory>,
    dispatcher: ToolDispatcher<S>,
    registry: ToolRegistry,
    config: AssistantConfig,
}

impl<S: BookingStore + Clone> Orchestrator<S> {
    /// Creates an orchestrator with the built-in tool set and default
    /// configuration.
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        messages: Arc<dyn MessageStore>,
        memory: Arc<dyn ConversationMemory>,
        dispatcher: ToolDispatcher<S>,
    ) -> Self {
        Self {
            backend,
            messages,
            memory,
            dispatcher,
            registry: ToolRegistry::builtin(),
            config: AssistantConfig::default(),
        }
    }

    /// Replaces the loop configuration.
    #[must_use]
    pub fn with_config(mut self, config: AssistantConfig) -> Self {
        self.config = config;
        self
    }

    /// Handles one guest message end to end and returns the stored reply.
    ///
    /// The guest message, every tool exchange, and the reply all land in
    /// the message store; the guest message and the reply are also added
    /// to conversation memory no matter how the round itself went.
    ///
    /// # Errors
    ///
    /// Returns an error only when history cannot be loaded or the guest
    /// message or reply cannot be persisted.
    pub async fn handle_message(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<Message, OrchestrationError> {
        let today = Utc::now().date_naive();

        // History is loaded before the guest message is persisted, so the
        // sequence carries the current message exactly once.
        let history = self
            .messages
            .history(conversation_id, self.config.history_limit)
            .await
            .map_err(|source| OrchestrationError::History { source })?;

        let user_message = self
            .messages
            .append(conversation_id, Sender::User, text, None)
            .await
            .map_err(|source| OrchestrationError::Persist { source })?;
        self.remember(&user_message).await;

        let mut sequence = Vec::with_capacity(history.len() + 2);
        sequence.push(ChatMessage::system(self.system_prompt(today)));
        sequence.extend(history.iter().map(to_chat_message));
        sequence.push(ChatMessage::user(text));

        let reply = match self.run_rounds(conversation_id, &mut sequence, today).await {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    DEFAULT_GREETING.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    conversation_id = %conversation_id,
                    "conversation round failed"
                );
                APOLOGY.to_string()
            }
        };

        let ai_message = self
            .messages
            .append(conversation_id, Sender::Ai, &reply, None)
            .await
            .map_err(|source| OrchestrationError::Persist { source })?;
        self.remember(&ai_message).await;

        Ok(ai_message)
    }

    /// Runs model rounds until the model answers in text or the round
    /// ceiling is hit, in which case one final call with no tools on offer
    /// forces a text answer.
    async fn run_rounds(
        &self,
        conversation_id: ConversationId,
        sequence: &mut Vec<ChatMessage>,
        today: NaiveDate,
    ) -> Result<String, LlmError> {
        for _ in 0..self.config.max_tool_rounds {
            let reply = self.backend.chat(sequence.as_slice(), self.registry.specs()).await?;
            if !reply.wants_tools() {
                return Ok(reply.content);
            }

            sequence.push(reply.as_assistant_message());
            for call in &reply.tool_calls {
                let outcome = self.execute_call(call, today).await;
                let payload = outcome.payload.to_string();
                self.record_tool_exchange(
                    conversation_id,
                    &call.name,
                    &payload,
                    outcome.summary.as_deref(),
                )
                .await;
                sequence.push(ChatMessage::tool(call.id.clone(), payload));
                if let Some(summary) = outcome.summary {
                    sequence.push(ChatMessage::system(summary));
                }
            }
        }

        let reply = self.backend.chat(sequence.as_slice(), &[]).await?;
        Ok(reply.content)
    }

    async fn execute_call(&self, call: &ToolCall, today: NaiveDate) -> ToolOutcome {
        match ToolRequest::parse(&call.name, &call.arguments) {
            Ok(request) => self.dispatcher.dispatch(&request, today).await,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "rejected tool call");
                ToolOutcome::error(e.to_string())
            }
        }
    }

    /// Writes a tool result, and its summary when one exists, into the
    /// transcript. The in-flight sequence stays authoritative for the
    /// model, so a lost transcript row never fails the round.
    async fn record_tool_exchange(
        &self,
        conversation_id: ConversationId,
        tool: &str,
        payload: &str,
        summary: Option<&str>,
    ) {
        let result = self
            .messages
            .append(conversation_id, Sender::Tool, payload, Some(vec![tool.to_string()]))
            .await;
        if let Err(e) = result {
            tracing::warn!(tool = %tool, error = %e, "failed to record tool result");
        }
        if let Some(summary) = summary {
            let result = self.messages.append(conversation_id, Sender::Ai, summary, None).await;
            if let Err(e) = result {
                tracing::warn!(tool = %tool, error = %e, "failed to record tool summary");
            }
        }
    }

    /// Memory writes never fail the exchange.
    async fn remember(&self, message: &Message) {
        let metadata = HashMap::from([
            ("sender".to_string(), message.sender.to_string()),
            ("message_id".to_string(), message.id.to_string()),
        ]);
        let result = self
            .memory
            .add_texts(message.conversation_id, &[message.content.clone()], &[metadata])
            .await;
        if let Err(e) = result {
            tracing::warn!(
                error = %e,
                message_id = %message.id,
                "failed to store message in conversation memory"
            );
        }
    }

    fn system_prompt(&self, today: NaiveDate) -> String {
        let vars = HashMap::from([
            ("today".to_string(), serde_json::json!(today.to_string())),
            ("current_year".to_string(), serde_json::json!(today.year())),
        ]);
        PromptTemplate::new("assistant_system", SYSTEM_PROMPT).render(&vars)
    }
}

// Tool transcripts re-enter the context as system notes; replaying them as
// assistant or tool turns would leave dangling tool-call ids.
fn to_chat_message(message: &Message) -> ChatMessage {
    match message.sender {
        Sender::User => ChatMessage::user(message.content.clone()),
        Sender::Ai => ChatMessage::assistant(message.content.clone()),
        Sender::Tool => ChatMessage::system(message.content.clone()),
    }
}
