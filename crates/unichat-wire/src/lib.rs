#![cfg_attr(not(test), deny(unsafe_code))]

//! Shared HTTP transport and stream framing for unichat provider adapters
//!
//! Provider modules in the `unichat` crate describe *what* to send; this crate
//! owns *how*: request construction and auth placement, error extraction from
//! failed responses, and the incremental decoders that turn raw byte streams
//! into discrete wire records.

pub mod error;
pub mod framing;
pub mod request;

pub use error::TransportError;
pub use framing::{Framer, JsonArrayFramer, RecordDecoder, SseFramer, WireRecord};
pub use request::{AuthMethod, Endpoint, HttpMethod, RequestBuilder, RequestConfig};

/// Re-export common types for convenience
pub use futures_util::stream::BoxStream;
