use std::time::Duration;

use async_stream::try_stream;
use bon::Builder;
use futures_util::stream::BoxStream;
use unichat_wire::{
    AuthMethod, Endpoint, Framer, HttpMethod, JsonArrayFramer, RecordDecoder, RequestBuilder,
    RequestConfig, SseFramer, TransportError, WireRecord,
};

use crate::error::ChatError;
use crate::event::{self, StreamEvent};
use crate::provider::Provider;
use crate::request::ChatRequest;
use crate::{gemini, openai};

/// Fallback catalogue served when the models endpoint is unreachable or
/// returns nothing usable.
pub const DEFAULT_MODELS: &[(&str, &str)] = &[
    ("gpt-4o", "GPT-4o"),
    ("gpt-4o-mini", "GPT-4o Mini"),
    ("gpt-4-turbo", "GPT-4 Turbo"),
    ("gpt-4", "GPT-4"),
    ("gpt-3.5-turbo", "GPT-3.5 Turbo"),
    ("gemini-2.5-flash", "Gemini 2.5 Flash"),
];

/// A model the picker UI can offer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub value: String,
    pub label: String,
}

/// Dual-protocol chat client
///
/// One client serves both provider families; the model name on each request
/// decides which transport a session uses.
#[derive(Debug, Clone, Builder)]
pub struct ChatClient {
    /// Base URL for OpenAI-compatible endpoints
    #[builder(default = "https://api.openai.com/v1".to_string(), into)]
    pub openai_base_url: String,

    /// Base URL for Gemini endpoints
    #[builder(default = "https://generativelanguage.googleapis.com/v1beta".to_string(), into)]
    pub gemini_base_url: String,

    /// HTTP client for making requests
    #[builder(default)]
    client: reqwest::Client,

    /// Abort a session when the stream is silent for this long. Off by
    /// default, matching the providers' own behavior.
    pub idle_timeout: Option<Duration>,
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ChatClient {
    /// Create a client with the standard provider endpoints
    pub fn new() -> Self {
        Self::default()
    }

    /// The request plumbing for one provider family: base URL plus where the
    /// API key goes (Bearer header for OpenAI, `key` query param for Gemini).
    fn request_builder(&self, provider: Provider, api_key: &str) -> RequestBuilder {
        let (base_url, auth) = match provider {
            Provider::OpenAi => (
                self.openai_base_url.clone(),
                AuthMethod::Bearer(api_key.to_string()),
            ),
            Provider::Gemini => (
                self.gemini_base_url.clone(),
                AuthMethod::QueryParam("key".to_string(), api_key.to_string()),
            ),
        };
        RequestBuilder::new(self.client.clone(), RequestConfig::new(base_url).with_auth(auth))
    }

    /// Open a streaming session and expose it as a typed event stream.
    ///
    /// The stream yields deltas in strict arrival order and terminates with
    /// exactly one [`StreamEvent::Done`], emitted either for the `[DONE]`
    /// sentinel or when the transport closes: Gemini has no in-band
    /// terminator, and a short OpenAI-family stream is not a protocol
    /// violation.
    pub fn events(
        &self,
        request: &ChatRequest,
        api_key: &str,
    ) -> BoxStream<'static, Result<StreamEvent, ChatError>> {
        let provider = request.provider();
        let builder = self.request_builder(provider, api_key);
        let (endpoint, body) = match provider {
            Provider::OpenAi => (
                Endpoint::new("chat/completions", HttpMethod::Post),
                serde_json::to_value(openai::CompletionsBody::from_request(request, true)),
            ),
            Provider::Gemini => (
                Endpoint::new(
                    format!("models/{}:streamGenerateContent", request.model),
                    HttpMethod::Post,
                ),
                serde_json::to_value(gemini::GenerateContentBody::from_request(request)),
            ),
        };

        Box::pin(try_stream! {
            let body = body.map_err(TransportError::from)?;
            let bytes = builder.open_stream(&endpoint, &body).await?;
            let framer: Box<dyn Framer + Send> = match provider {
                Provider::OpenAi => Box::new(SseFramer::new()),
                Provider::Gemini => Box::new(JsonArrayFramer::new()),
            };
            let mut decoder = RecordDecoder::new(bytes, framer);

            loop {
                match decoder.next_record().await.map_err(ChatError::from)? {
                    Some(WireRecord::Json(record)) => {
                        if let Some(text) = event::delta_text(provider, record) {
                            yield StreamEvent::Delta(text);
                        }
                    }
                    // Dropping the decoder here releases the connection, so
                    // bytes arriving after the sentinel are never read.
                    Some(WireRecord::Done) | None => {
                        yield StreamEvent::Done;
                        break;
                    }
                }
            }
        })
    }

    /// Non-streaming convenience: send the whole conversation and return the
    /// assistant's reply text.
    pub async fn send(&self, request: &ChatRequest, api_key: &str) -> Result<String, ChatError> {
        let provider = request.provider();
        let builder = self.request_builder(provider, api_key);

        match provider {
            Provider::OpenAi => {
                let endpoint = Endpoint::new("chat/completions", HttpMethod::Post);
                let body = openai::CompletionsBody::from_request(request, false);
                let response: openai::ChatCompletionResponse =
                    builder.request_json(&endpoint, Some(&body)).await?;
                Ok(response.content().unwrap_or_default().to_string())
            }
            Provider::Gemini => {
                let endpoint = Endpoint::new(
                    format!("models/{}:generateContent", request.model),
                    HttpMethod::Post,
                );
                let body = gemini::GenerateContentBody::from_request(request);
                let response: gemini::GenerateContentChunk =
                    builder.request_json(&endpoint, Some(&body)).await?;
                Ok(response.text().unwrap_or_default())
            }
        }
    }

    /// Model catalogue for the picker UI.
    ///
    /// Filters the OpenAI models endpoint down to `gpt-` ids, sorts the
    /// well-known models first, and falls back to [`DEFAULT_MODELS`] when the
    /// endpoint is unreachable or returns nothing usable.
    pub async fn list_models(&self, api_key: &str) -> Vec<ModelOption> {
        let builder = self.request_builder(Provider::OpenAi, api_key);
        let endpoint = Endpoint::new("models", HttpMethod::Get);

        match builder
            .request_json::<openai::ModelsResponse, ()>(&endpoint, None)
            .await
        {
            Ok(response) => {
                let mut models: Vec<ModelOption> = response
                    .data
                    .into_iter()
                    .filter(|model| model.id.starts_with("gpt-"))
                    .map(|model| ModelOption {
                        label: model.id.clone(),
                        value: model.id,
                    })
                    .collect();
                if models.is_empty() {
                    return Self::default_models();
                }
                models.sort_by_key(|model| Self::model_priority(&model.value));
                models
            }
            Err(_) => Self::default_models(),
        }
    }

    /// Display order for the known model generations.
    fn model_priority(id: &str) -> usize {
        match id {
            "gpt-4o" => 1,
            "gpt-4o-mini" => 2,
            "gpt-4-turbo" => 3,
            "gpt-4" => 4,
            "gpt-3.5-turbo" => 5,
            _ => 100,
        }
    }

    fn default_models() -> Vec<ModelOption> {
        DEFAULT_MODELS
            .iter()
            .map(|(value, label)| ModelOption {
                value: (*value).to_string(),
                label: (*label).to_string(),
            })
            .collect()
    }
}
