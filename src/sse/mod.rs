//! SSE (Server-Sent Events) stream decoder
//!
//! Decodes the body of `POST /api/chat` into [`StreamEvent`]s.
//! The wire format is a sequence of records:
//! - `data: <json>` - one event payload per line
//! - Empty line - record separator
//! - Anything else - keep-alives, comments, other fields (ignored)
//!
//! # Module structure
//! - `events` - Event type definitions (StreamEvent)
//! - `parser` - Line classification and record decoding
//! - `decoder` - Incremental UTF-8 and line buffering (SseDecoder)
//! - `stream` - Async adapter over a response body (EventStream)

mod decoder;
mod events;
mod parser;
mod stream;

pub use decoder::{decode_chunks, SseDecoder, Utf8Decoder};
pub use events::StreamEvent;
pub use parser::{parse_line, parse_record, parse_sse_line, SseLine, DATA_PREFIX};
pub use stream::{decode_body, decode_response, EventStream};
