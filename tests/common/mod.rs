//! Common test utilities for integration tests.
//!
//! Helpers for building SSE bodies, mock transports and wiremock
//! responses.
//!
//! # Example
//!
//! ```ignore
//! use common::{sse_body, MockChatBackend};
//!
//! let backend = MockChatBackend::new().with_chunks(&[&sse_body(&[token("Hi")])]);
//! let mut session = backend.session("docs");
//! ```

pub mod mocks;

#[allow(unused_imports)]
pub use mocks::*;

use serde_json::{json, Value};

/// One `data: ` record, terminated by a blank line.
pub fn record(payload: &Value) -> String {
    format!("data: {}\n\n", payload)
}

/// A full SSE body made of the given payloads.
pub fn sse_body(payloads: &[Value]) -> String {
    payloads.iter().map(record).collect()
}

pub fn token(text: &str) -> Value {
    json!({ "token": text })
}

pub fn done(sources: Value) -> Value {
    json!({ "done": true, "sources": sources })
}

#[allow(dead_code)]
pub fn error(message: &str) -> Value {
    json!({ "error": message })
}

/// Split `body` at every byte offset in `cuts`.
#[allow(dead_code)]
pub fn split_at(body: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for &cut in cuts {
        chunks.push(body[start..cut].to_vec());
        start = cut;
    }
    chunks.push(body[start..].to_vec());
    chunks
}
