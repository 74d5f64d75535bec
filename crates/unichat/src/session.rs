use std::time::Duration;

use futures_util::{StreamExt, stream::BoxStream};
use tokio_util::sync::CancellationToken;

use crate::client::ChatClient;
use crate::error::ChatError;
use crate::event::StreamEvent;
use crate::message::ChatMessage;
use crate::request::ChatRequest;

/// Cancellation handle for one streaming session.
///
/// Cancelling releases the underlying network read promptly. A cancelled
/// session fires no further callback of any kind: cancellation is neither a
/// completion nor an error. Clones share the same token, so the caller can
/// keep one and hand the other to the session.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    token: CancellationToken,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the session this handle was passed to.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl ChatClient {
    /// Stream one conversation turn, reporting progress through callbacks.
    ///
    /// Contract: zero or more `on_chunk` calls in strict arrival order, then
    /// exactly one of `on_complete` / `on_error`. Nothing fires after the
    /// terminal callback, and nothing fires after cancellation. A stream
    /// that closes without an explicit terminator still completes normally;
    /// partial responses are not a protocol violation.
    ///
    /// Issuing a second send for the same conversation while one is pending
    /// is the caller's mistake to prevent; [`crate::Transcript`] refuses to
    /// open a second placeholder for exactly that reason.
    pub async fn send_stream(
        &self,
        request: &ChatRequest,
        api_key: &str,
        handle: &SessionHandle,
        mut on_chunk: impl FnMut(&str),
        on_complete: impl FnOnce(),
        on_error: impl FnOnce(ChatError),
    ) {
        let mut events = self.events(request, api_key);

        loop {
            let next = tokio::select! {
                biased;
                () = handle.token.cancelled() => return,
                next = next_event(&mut events, self.idle_timeout) => next,
            };
            match next {
                Ok(Some(StreamEvent::Delta(text))) => on_chunk(&text),
                Ok(Some(StreamEvent::Done)) | Ok(None) => {
                    on_complete();
                    return;
                }
                Err(error) => {
                    on_error(error);
                    return;
                }
            }
        }
    }
}

/// One read from the event stream, bounded by the idle timeout when set.
async fn next_event(
    events: &mut BoxStream<'static, Result<StreamEvent, ChatError>>,
    idle_timeout: Option<Duration>,
) -> Result<Option<StreamEvent>, ChatError> {
    let next = match idle_timeout {
        Some(limit) => match tokio::time::timeout(limit, events.next()).await {
            Ok(next) => next,
            Err(_) => return Err(ChatError::Stalled(limit)),
        },
        None => events.next().await,
    };
    next.transpose()
}

/// Callback-style entry point in the shape UI layers expect: build the
/// request from raw parts and drive it to its single terminal callback.
pub async fn send_chat_message_stream(
    client: &ChatClient,
    messages: Vec<ChatMessage>,
    model: &str,
    api_key: &str,
    handle: &SessionHandle,
    on_chunk: impl FnMut(&str),
    on_complete: impl FnOnce(),
    on_error: impl FnOnce(ChatError),
) {
    let request = ChatRequest::builder().model(model).messages(messages).build();
    client
        .send_stream(&request, api_key, handle, on_chunk, on_complete, on_error)
        .await;
}
