use crate::error::ChatError;
use crate::message::{ChatMessage, Role};

/// A message as rendered in the conversation view
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayMessage {
    /// Unique, monotonically increasing within one transcript
    pub id: u64,
    pub role: Role,
    pub content: String,
    /// True while a streaming session is still writing into this message.
    /// Content is append-only while pending; once cleared it is frozen.
    pub pending: bool,
}

/// The ordered list of display messages for one conversation, plus the rules
/// for applying session events to it.
///
/// At most one message is pending at a time: [`Transcript::begin_assistant_turn`]
/// refuses to open a second placeholder while one is in flight, which keeps
/// interleaved deltas from two sessions out of a single message. Callers
/// disable their send control while [`Transcript::is_busy`] is true.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<DisplayMessage>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[DisplayMessage] {
        &self.messages
    }

    /// The conversation as request messages, for the next turn's payload.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|message| ChatMessage {
                role: message.role,
                content: message.content.clone(),
            })
            .collect()
    }

    /// True while an assistant turn is streaming
    pub fn is_busy(&self) -> bool {
        self.messages.iter().any(|message| message.pending)
    }

    fn push(&mut self, role: Role, content: String, pending: bool) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(DisplayMessage {
            id,
            role,
            content,
            pending,
        });
        id
    }

    /// Append a frozen user message.
    pub fn append_user_turn(&mut self, text: impl Into<String>) -> u64 {
        self.push(Role::User, text.into(), false)
    }

    /// Open an empty assistant placeholder for an incoming stream and return
    /// its id. Returns `None` while another turn is still pending.
    pub fn begin_assistant_turn(&mut self) -> Option<u64> {
        if self.is_busy() {
            return None;
        }
        Some(self.push(Role::Assistant, String::new(), true))
    }

    /// Append streamed text to the placeholder. Deltas for a finalized,
    /// unknown or superseded id are ignored, so a stale callback from a
    /// replaced session cannot corrupt the transcript.
    pub fn apply_delta(&mut self, id: u64, text: &str) {
        if let Some(message) = self.pending_mut(id) {
            message.content.push_str(text);
        }
    }

    /// Freeze the placeholder as the final assistant message.
    pub fn finalize(&mut self, id: u64) {
        if let Some(message) = self.pending_mut(id) {
            message.pending = false;
        }
    }

    /// Freeze the placeholder with an error description as its content. The
    /// conversation stays usable; the next send opens a fresh placeholder.
    pub fn fail(&mut self, id: u64, error: &ChatError) {
        if let Some(message) = self.pending_mut(id) {
            message.content = format!("Error: {error}");
            message.pending = false;
        }
    }

    /// Reset to an empty conversation. Ids keep counting up so stale ids
    /// from before the reset can never match a new message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn pending_mut(&mut self, id: u64) -> Option<&mut DisplayMessage> {
        self.messages
            .iter_mut()
            .find(|message| message.id == id && message.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;

    #[test]
    fn deltas_concatenate_in_delivery_order() {
        let mut transcript = Transcript::new();
        transcript.append_user_turn("Hi");
        let id = transcript.begin_assistant_turn().unwrap();

        for delta in ["Hel", "lo", " ", "there"] {
            transcript.apply_delta(id, delta);
        }
        transcript.finalize(id);

        let message = transcript.messages().last().unwrap();
        assert_eq!(message.content, "Hello there");
        assert!(!message.pending);
        assert!(!transcript.is_busy());
    }

    #[test]
    fn second_turn_is_refused_while_pending() {
        let mut transcript = Transcript::new();
        let first = transcript.begin_assistant_turn().unwrap();
        assert!(transcript.is_busy());
        assert_eq!(transcript.begin_assistant_turn(), None);

        transcript.finalize(first);
        assert!(transcript.begin_assistant_turn().is_some());
    }

    #[test]
    fn finalized_message_is_frozen_against_stale_deltas() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_assistant_turn().unwrap();
        transcript.apply_delta(id, "done");
        transcript.finalize(id);

        transcript.apply_delta(id, " and more");
        assert_eq!(transcript.messages()[0].content, "done");
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut transcript = Transcript::new();
        let id = transcript.begin_assistant_turn().unwrap();
        transcript.apply_delta(id + 17, "lost");
        transcript.finalize(id + 17);
        assert_eq!(transcript.messages()[0].content, "");
        assert!(transcript.is_busy());
    }

    #[test]
    fn fail_replaces_content_and_unblocks_the_conversation() {
        let mut transcript = Transcript::new();
        transcript.append_user_turn("Hi");
        let id = transcript.begin_assistant_turn().unwrap();
        transcript.apply_delta(id, "partial");

        transcript.fail(id, &ChatError::MissingApiKey(Provider::OpenAi));

        let message = transcript.messages().last().unwrap();
        assert_eq!(message.content, "Error: missing API key for provider openai");
        assert!(!message.pending);
        assert!(!transcript.is_busy());
        assert!(transcript.begin_assistant_turn().is_some());
    }

    #[test]
    fn ids_stay_monotonic_across_clear() {
        let mut transcript = Transcript::new();
        let before = transcript.append_user_turn("a");
        transcript.clear();
        assert!(transcript.messages().is_empty());
        let after = transcript.append_user_turn("b");
        assert!(after > before);
    }

    #[test]
    fn chat_messages_mirror_the_conversation() {
        let mut transcript = Transcript::new();
        transcript.append_user_turn("Hi");
        let id = transcript.begin_assistant_turn().unwrap();
        transcript.apply_delta(id, "Hello");
        transcript.finalize(id);

        let messages = transcript.chat_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::user("Hi"));
        assert_eq!(messages[1], ChatMessage::assistant("Hello"));
    }
}
