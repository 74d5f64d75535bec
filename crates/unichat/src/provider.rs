/// Marker prefix that routes a model identifier to the Gemini transport.
const GEMINI_MODEL_PREFIX: &str = "gemini-";

/// The two wire protocols unichat speaks.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
pub enum Provider {
    /// OpenAI-compatible chunked SSE (`POST /chat/completions`)
    #[strum(to_string = "openai")]
    OpenAi,
    /// Google Gemini streamed JSON array (`POST :streamGenerateContent`)
    #[strum(to_string = "gemini")]
    Gemini,
}

impl Provider {
    /// Resolve the provider family for a model identifier.
    ///
    /// The `gemini-` prefix routes to the Gemini transport; everything else
    /// goes to the OpenAI-compatible one. This is the only dispatch point:
    /// callers never pick a transport directly.
    pub fn for_model(model: &str) -> Self {
        if model.starts_with(GEMINI_MODEL_PREFIX) {
            Self::Gemini
        } else {
            Self::OpenAi
        }
    }
}
