use serde_json::Value;

use crate::provider::Provider;

/// A provider-neutral streaming event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental fragment of assistant text, in arrival order.
    ///
    /// A delta does not correspond to any displayable token boundary; callers
    /// concatenate deltas as-is, with no reordering, deduplication or
    /// trimming.
    Delta(String),
    /// Terminal marker: the `[DONE]` sentinel for the OpenAI family, or the
    /// transport closing for Gemini. Emitted exactly once per session.
    Done,
}

/// Map one decoded wire record to its delta text, if it carries any.
///
/// Records that deserialize to nothing displayable (role-only deltas,
/// finish-reason markers, keep-alive noise) yield `None` and are skipped.
pub(crate) fn delta_text(provider: Provider, record: Value) -> Option<String> {
    match provider {
        Provider::OpenAi => crate::openai::delta_text(record),
        Provider::Gemini => crate::gemini::delta_text(record),
    }
}
