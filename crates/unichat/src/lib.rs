#![cfg_attr(not(test), deny(unsafe_code))]

//! Streaming chat client that speaks two vendor wire protocols — the
//! OpenAI-compatible chunked SSE format and Gemini's streamed JSON array —
//! behind one incremental event interface.
//!
//! The model name routes each request: `gemini-*` goes to the Gemini
//! transport, everything else to the OpenAI-compatible one. Sessions deliver
//! deltas in arrival order and end with exactly one terminal callback.
//!
//! # Example
//!
//! ```rust,no_run
//! use unichat::{ChatClient, ChatRequest, SessionHandle};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = ChatClient::new();
//!     let request = ChatRequest::builder()
//!         .model("gpt-4o-mini")
//!         .system_message("You are helpful")
//!         .user_message("Hi")
//!         .build();
//!
//!     let handle = SessionHandle::new();
//!     client
//!         .send_stream(
//!             &request,
//!             "your-api-key",
//!             &handle,
//!             |delta| print!("{delta}"),
//!             || println!(),
//!             |error| eprintln!("chat failed: {error}"),
//!         )
//!         .await;
//! }
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod event;
pub mod gemini;
pub mod message;
pub mod openai;
pub mod provider;
pub mod request;
pub mod session;
pub mod transcript;

// Re-export main types
pub use client::{ChatClient, DEFAULT_MODELS, ModelOption};
pub use credentials::{CredentialStore, MemoryCredentialStore, require_key};
pub use error::ChatError;
pub use event::StreamEvent;
pub use message::{ChatMessage, Role};
pub use provider::Provider;
pub use request::ChatRequest;
pub use session::{SessionHandle, send_chat_message_stream};
pub use transcript::{DisplayMessage, Transcript};
