//! OpenAI-compatible wire format: request bodies, the streaming chunk shape,
//! and the model catalogue endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::ChatMessage;
use crate::request::ChatRequest;

/// Body for `POST /chat/completions`
#[derive(Debug, Serialize)]
pub(crate) struct CompletionsBody<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionsBody<'a> {
    pub fn from_request(request: &'a ChatRequest, stream: bool) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            stream,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

/// One streamed chunk of a chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

/// Streaming choice delta
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// The partial message delta
    #[serde(default)]
    pub delta: MessageDelta,

    /// Informational only: completion is driven by the `[DONE]` sentinel,
    /// since some compatible providers omit a finish reason entirely.
    pub finish_reason: Option<String>,
}

/// Partial message for streaming
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageDelta {
    /// Message role, sent on the first chunk only
    pub role: Option<String>,

    /// Partial content
    pub content: Option<String>,
}

/// Response from a non-streaming chat completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

/// A completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

impl ChatCompletionResponse {
    /// Get the content of the first choice, if available
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
    }
}

/// Response from the models list endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelInfo>,
}

/// Model information
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

/// Extract the delta text from one wire record: `choices[0].delta.content`
/// when it is a non-empty string.
pub(crate) fn delta_text(record: Value) -> Option<String> {
    let chunk: ChatCompletionChunk = serde_json::from_value(record).ok()?;
    let choice = chunk.choices.into_iter().next()?;
    choice.delta.content.filter(|content| !content.is_empty())
}
