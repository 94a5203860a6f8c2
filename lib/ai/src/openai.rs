//! OpenAI-compatible chat completion and embedding client.

use crate::backend::{EmbeddingBackend, LlmBackend, LlmConfig};
use crate::chat::{ChatMessage, ChatReply, ChatRole, ToolCall, ToolSpec};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Client for any API speaking the OpenAI chat-completions protocol.
///
/// One instance serves both chat and embedding calls, sharing the
/// connection pool and credentials.
pub struct OpenAiBackend {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Creates a new backend from the given configuration.
    #[must_use]
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.api_base.trim_end_matches('/'))
    }

    fn chat_body(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> ChatCompletionBody {
        ChatCompletionBody {
            model: self.config.model.clone(),
            messages: messages.iter().map(WireMessage::from).collect(),
            temperature: self.config.temperature,
            tools: tools.iter().map(WireTool::from).collect(),
        }
    }

    async fn post_json(&self, url: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::RequestFailed {
            reason: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatReply, LlmError> {
        let body = self.chat_body(messages, tools);
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "requesting chat completion"
        );
        let text = self.post_json(&self.chat_url(), &body).await?;
        parse_chat_response(&text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAiBackend {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = EmbeddingBody {
            model: self.config.embedding_model.clone(),
            input: texts.to_vec(),
        };
        let text = self.post_json(&self.embeddings_url(), &body).await?;
        parse_embedding_response(&text, texts.len())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        let role = match message.role {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
            ChatRole::Tool => "tool",
        };
        Self {
            role,
            content: message.content.clone(),
            tool_calls: message.tool_calls.iter().map(WireToolCall::from).collect(),
            tool_call_id: message.tool_call_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: WireFunctionCall,
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: "function".to_string(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionSpec,
}

impl From<&ToolSpec> for WireTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: "function",
            function: WireFunctionSpec {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireFunctionSpec {
    name: String,
    description: String,
    parameters: JsonValue,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

fn parse_chat_response(text: &str) -> Result<ChatReply, LlmError> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(text).map_err(|e| LlmError::ResponseParseFailed {
            reason: e.to_string(),
        })?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ResponseParseFailed {
            reason: "response carried no choices".to_string(),
        })?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall {
            id: call.id,
            name: call.function.name,
            arguments: call.function.arguments,
        })
        .collect();

    Ok(ChatReply {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
    })
}

#[derive(Debug, Serialize)]
struct EmbeddingBody {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

fn parse_embedding_response(text: &str, expected: usize) -> Result<Vec<Vec<f32>>, LlmError> {
    let mut parsed: EmbeddingResponse =
        serde_json::from_str(text).map_err(|e| LlmError::ResponseParseFailed {
            reason: e.to_string(),
        })?;
    if parsed.data.len() != expected {
        return Err(LlmError::ResponseParseFailed {
            reason: format!(
                "expected {expected} embeddings, got {}",
                parsed.data.len()
            ),
        });
    }
    parsed.data.sort_by_key(|datum| datum.index);
    Ok(parsed.data.into_iter().map(|datum| datum.embedding).collect())
}
