use bon::Builder;

use crate::message::ChatMessage;
use crate::provider::Provider;

/// A provider-agnostic chat request
#[derive(Debug, Clone, Builder)]
#[builder(builder_type(vis = "pub"), state_mod(vis = "pub"))]
pub struct ChatRequest {
    /// List of messages in the conversation
    #[builder(field)]
    pub messages: Vec<ChatMessage>,

    /// The model to use for completion; also selects the provider family
    #[builder(into)]
    pub model: String,

    /// Sampling temperature. Gemini falls back to 0.7 when unset.
    pub temperature: Option<f32>,

    /// Output token cap. Gemini falls back to 8192 when unset.
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// The provider family this request routes to.
    pub fn provider(&self) -> Provider {
        Provider::for_model(&self.model)
    }
}

// Builder extensions for convenience methods
impl<S: chat_request_builder::State> ChatRequestBuilder<S> {
    /// Add a user message
    pub fn user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// Add an assistant message
    pub fn assistant_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::assistant(content));
        self
    }

    /// Add a system message
    pub fn system_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::system(content));
        self
    }

    /// Add a message
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Add all messages from an existing conversation
    pub fn messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }
}
