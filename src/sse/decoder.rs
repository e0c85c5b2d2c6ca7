//! Incremental decoder from raw body chunks to [`StreamEvent`]s.
//!
//! Network chunk boundaries are arbitrary: a chunk may end in the middle of
//! a line, or in the middle of a multi-byte UTF-8 character. The decoder
//! keeps both kinds of leftovers between calls so that the events produced
//! never depend on how the body was split.

use super::events::StreamEvent;
use super::parser::parse_line;

/// Replacement for invalid byte sequences.
const REPLACEMENT: char = '\u{FFFD}';

/// Incremental UTF-8 text decoder.
///
/// Holds back an incomplete trailing sequence (at most 3 bytes) until the
/// next chunk completes it. Invalid sequences become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `pending ++ chunk` as is complete.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT);
                            rest = &rest[valid + len..];
                        }
                        None => {
                            // Incomplete sequence at the end; wait for more bytes
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Line-buffering stream decoder.
///
/// # Example
///
/// ```
/// use ragchat::sse::{SseDecoder, StreamEvent};
///
/// let mut decoder = SseDecoder::new();
/// let mut events = decoder.feed(br#"data: {"token":"Bonj"#);
/// events.extend(decoder.feed(b"our\"}\n\n"));
/// assert_eq!(events, vec![StreamEvent::Token("Bonjour".to_string())]);
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    utf8: Utf8Decoder,
    buffer: String,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk; returns the events completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };

        let fragment = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, fragment);

        complete[..last_newline]
            .split('\n')
            .flat_map(parse_line)
            .collect()
    }

    /// Text received after the last newline.
    pub fn fragment(&self) -> &str {
        &self.buffer
    }

    /// End of body. The unterminated fragment is discarded, never parsed.
    ///
    /// Returns the discarded text so callers can log it.
    pub fn finish(self) -> String {
        if self.utf8.pending_len() > 0 {
            tracing::debug!(
                "Discarding {} bytes of an incomplete character",
                self.utf8.pending_len()
            );
        }
        self.buffer
    }
}

/// Decode a complete sequence of chunks.
pub fn decode_chunks<I, B>(chunks: I) -> Vec<StreamEvent>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut decoder = SseDecoder::new();
    let mut events = Vec::new();
    for chunk in chunks {
        events.extend(decoder.feed(chunk.as_ref()));
    }
    let leftover = decoder.finish();
    if !leftover.is_empty() {
        tracing::debug!("Discarding unterminated stream fragment: {:?}", leftover);
    }
    events
}
