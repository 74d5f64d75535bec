use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::{StreamExt, stream::BoxStream};
use serde_json::Value;

use crate::error::TransportError;

/// A decoded provider wire record.
#[derive(Debug, Clone, PartialEq)]
pub enum WireRecord {
    /// One parsed JSON record from the stream.
    Json(Value),
    /// The provider's explicit end-of-stream marker (`data: [DONE]`).
    Done,
}

/// Incremental splitter from raw bytes to provider wire records.
///
/// Implementations are push-based and infallible: a record that will not
/// parse is dropped and counted, never raised, so keep-alive noise inside an
/// otherwise healthy stream cannot kill the session. Fragment boundaries
/// carry no meaning; records split across pushes are reassembled. Framing
/// works on bytes and text is decoded per extracted record, so multi-byte
/// UTF-8 sequences torn across network chunks are never corrupted.
pub trait Framer {
    /// Feed the next fragment of the byte stream, returning any records it
    /// completed.
    fn push(&mut self, fragment: &[u8]) -> Vec<WireRecord>;

    /// Signal end-of-input and flush whatever the buffer still holds.
    fn finish(&mut self) -> Vec<WireRecord>;

    /// Number of records discarded because they would not parse.
    fn dropped_records(&self) -> usize;
}

impl<F: Framer + ?Sized> Framer for Box<F> {
    fn push(&mut self, fragment: &[u8]) -> Vec<WireRecord> {
        (**self).push(fragment)
    }

    fn finish(&mut self) -> Vec<WireRecord> {
        (**self).finish()
    }

    fn dropped_records(&self) -> usize {
        (**self).dropped_records()
    }
}

/// Framer for OpenAI-family `text/event-stream` bodies.
///
/// Splits on `\n`, holding back the trailing (possibly incomplete) line
/// between pushes. Blank lines, comments and non-`data:` fields are ignored;
/// `data: [DONE]` is the terminal sentinel, after which all further input is
/// discarded.
#[derive(Debug, Default)]
pub struct SseFramer {
    /// Unconsumed bytes, at most one partial line.
    buffer: Vec<u8>,
    /// Set once the `[DONE]` sentinel has been seen.
    done: bool,
    /// Count of payloads that failed to parse as JSON.
    dropped: usize,
}

impl SseFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one complete line into a record, if it carries one.
    fn decode_line(&mut self, line: &[u8]) -> Option<WireRecord> {
        let Ok(line) = std::str::from_utf8(line) else {
            self.dropped += 1;
            return None;
        };
        let payload = line.trim().strip_prefix("data:")?.trim();
        if payload.is_empty() {
            return None;
        }
        if payload == "[DONE]" {
            self.done = true;
            return Some(WireRecord::Done);
        }
        match serde_json::from_str(payload) {
            Ok(value) => Some(WireRecord::Json(value)),
            Err(_) => {
                self.dropped += 1;
                None
            }
        }
    }
}

impl Framer for SseFramer {
    fn push(&mut self, fragment: &[u8]) -> Vec<WireRecord> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(fragment);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(record) = self.decode_line(&line) {
                records.push(record);
            }
            if self.done {
                self.buffer.clear();
                break;
            }
        }
        records
    }

    fn finish(&mut self) -> Vec<WireRecord> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    fn dropped_records(&self) -> usize {
        self.dropped
    }
}

/// Framer for Gemini's streamed JSON array bodies.
///
/// The wire is `[{...},{...},...]` with no line discipline, so each record is
/// recovered by brace-depth counting. The scanner is string- and
/// escape-aware: a `{` or `}` inside a string value (including the delta text
/// itself) never affects the depth. Consumed input is discarded so later
/// pushes never rescan it. There is no in-band terminator; the caller treats
/// end-of-input as completion.
#[derive(Debug, Default)]
pub struct JsonArrayFramer {
    /// Unconsumed bytes: anything after the last extracted record.
    buffer: Vec<u8>,
    /// Offset into `buffer` from which scanning resumes.
    scan_pos: usize,
    /// Current object nesting depth.
    depth: u32,
    /// True while inside a JSON string literal.
    in_string: bool,
    /// True when the previous byte inside a string was a backslash.
    escaped: bool,
    /// Offset of the `{` opening the record currently being scanned.
    start: Option<usize>,
    /// Count of extracted objects that failed to parse.
    dropped: usize,
}

impl JsonArrayFramer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Framer for JsonArrayFramer {
    fn push(&mut self, fragment: &[u8]) -> Vec<WireRecord> {
        self.buffer.extend_from_slice(fragment);

        let mut records = Vec::new();
        let mut consumed = 0;
        let mut i = self.scan_pos;
        while i < self.buffer.len() {
            let byte = self.buffer[i];
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
            } else {
                match byte {
                    b'"' => self.in_string = true,
                    b'{' => {
                        if self.depth == 0 {
                            self.start = Some(i);
                        }
                        self.depth += 1;
                    }
                    b'}' if self.depth > 0 => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            if let Some(start) = self.start.take() {
                                match serde_json::from_slice(&self.buffer[start..=i]) {
                                    Ok(value) => records.push(WireRecord::Json(value)),
                                    Err(_) => self.dropped += 1,
                                }
                            }
                            consumed = i + 1;
                        }
                    }
                    // Array brackets, separators and whitespace between
                    // records carry no information.
                    _ => {}
                }
            }
            i += 1;
        }

        self.buffer.drain(..consumed);
        if let Some(start) = self.start.as_mut() {
            *start -= consumed;
        }
        self.scan_pos = self.buffer.len();
        records
    }

    fn finish(&mut self) -> Vec<WireRecord> {
        // A record still open at end-of-input is truncated; drop it.
        if self.start.take().is_some() {
            self.dropped += 1;
        }
        self.buffer.clear();
        self.scan_pos = 0;
        Vec::new()
    }

    fn dropped_records(&self) -> usize {
        self.dropped
    }
}

/// Pull-based decoder: drives a byte stream through a framer, yielding wire
/// records in strict arrival order. One-shot per session; not restartable.
pub struct RecordDecoder {
    bytes: BoxStream<'static, Result<Bytes, TransportError>>,
    framer: Box<dyn Framer + Send>,
    pending: VecDeque<WireRecord>,
    exhausted: bool,
}

impl RecordDecoder {
    pub fn new(
        bytes: BoxStream<'static, Result<Bytes, TransportError>>,
        framer: impl Framer + Send + 'static,
    ) -> Self {
        Self {
            bytes,
            framer: Box::new(framer),
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Get the next record, or `None` once the underlying stream is done.
    pub async fn next_record(&mut self) -> Result<Option<WireRecord>, TransportError> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }
            match self.bytes.next().await {
                Some(chunk) => {
                    let chunk = chunk?;
                    self.pending.extend(self.framer.push(&chunk));
                }
                None => {
                    self.exhausted = true;
                    self.pending.extend(self.framer.finish());
                }
            }
        }
    }

    pub fn dropped_records(&self) -> usize {
        self.framer.dropped_records()
    }
}
