use std::time::Duration;

use thiserror::Error;
use unichat_wire::TransportError;

use crate::provider::Provider;

/// Errors surfaced to unichat callers.
///
/// A malformed record inside a healthy stream never appears here; the wire
/// layer drops those locally. Whatever does reach a session's error callback
/// is terminal for that session.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Structural transport failure: connection problems or a non-2xx status
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// No stored credential for the provider the model routed to
    #[error("missing API key for provider {0}")]
    MissingApiKey(Provider),

    /// The stream produced nothing within the configured idle timeout
    #[error("stream stalled: no data for {0:?}")]
    Stalled(Duration),
}
