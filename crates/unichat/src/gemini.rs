//! Gemini wire format: request body translation and the streamed chunk
//! shape. Gemini's protocol has no system turn and no end-of-stream
//! sentinel; both differences are absorbed here and in the session layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Role;
use crate::request::ChatRequest;

/// Defaults applied when the request leaves tuning fields unset.
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

/// Body for `POST models/{model}:streamGenerateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

/// A conversation turn in Gemini's content format
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

/// A text part of a content turn
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerateContentBody {
    /// Translate a provider-neutral request onto the Gemini wire:
    /// `assistant` becomes `model`, `user` stays `user`, and system turns
    /// are lifted out of the conversation into `systemInstruction`.
    pub fn from_request(request: &ChatRequest) -> Self {
        let contents = request
            .messages
            .iter()
            .filter(|message| message.role != Role::System)
            .map(|message| {
                let role = match message.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                Content {
                    role: Some(role.to_string()),
                    parts: vec![Part {
                        text: message.content.clone(),
                    }],
                }
            })
            .collect();

        let system_instruction = request
            .messages
            .iter()
            .find(|message| message.role == Role::System)
            .map(|message| Content {
                role: None,
                parts: vec![Part {
                    text: message.content.clone(),
                }],
            });

        Self {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            },
        }
    }
}

/// One element of the streamed response array; also the shape of a
/// non-streaming `:generateContent` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentChunk {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A response candidate
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

/// The content of a candidate
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// One part of a candidate's content; non-text parts deserialize with
/// `text: None` and contribute nothing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

impl GenerateContentChunk {
    /// The concatenated text of the first candidate's parts, if any.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Extract the delta text from one wire record. Falls back to a bare
/// top-level `text` field so partial records recovered from damaged streams
/// still surface their payload.
pub(crate) fn delta_text(record: Value) -> Option<String> {
    if let Ok(chunk) = serde_json::from_value::<GenerateContentChunk>(record.clone()) {
        if let Some(text) = chunk.text() {
            return Some(text);
        }
    }
    record
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn delta_text_walks_candidate_parts() {
        let record = json!({"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]});
        assert_eq!(delta_text(record).as_deref(), Some("Hello"));
    }

    #[test]
    fn nested_braces_in_text_survive() {
        let record = json!({"candidates":[{"content":{"parts":[{"text":"a{b}c"}]}}]});
        assert_eq!(delta_text(record).as_deref(), Some("a{b}c"));
    }

    #[test]
    fn empty_or_missing_candidates_are_skipped() {
        assert_eq!(delta_text(json!({"candidates":[]})), None);
        assert_eq!(delta_text(json!({"usageMetadata":{"totalTokenCount":3}})), None);
        assert_eq!(
            delta_text(json!({"candidates":[{"content":{"parts":[]}}]})),
            None
        );
    }

    #[test]
    fn bare_text_field_is_a_fallback() {
        assert_eq!(delta_text(json!({"text":"hi"})).as_deref(), Some("hi"));
    }

    #[test]
    fn body_maps_roles_and_lifts_system_instruction() {
        let request = ChatRequest::builder()
            .model("gemini-2.5-flash")
            .system_message("You are helpful")
            .user_message("Hi")
            .assistant_message("Hello!")
            .user_message("How are you?")
            .build();

        let value = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert_eq!(
            value["contents"],
            json!([
                {"role":"user","parts":[{"text":"Hi"}]},
                {"role":"model","parts":[{"text":"Hello!"}]},
                {"role":"user","parts":[{"text":"How are you?"}]},
            ])
        );
        assert_eq!(
            value["systemInstruction"],
            json!({"parts":[{"text":"You are helpful"}]})
        );
        let temperature = value["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn body_omits_system_instruction_when_absent() {
        let request = ChatRequest::builder()
            .model("gemini-2.5-flash")
            .user_message("Hi")
            .build();
        let value = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert!(value.get("systemInstruction").is_none());
    }
}
