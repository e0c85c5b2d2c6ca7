//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - HTTP client operations (GET, POST, DELETE, multipart, streaming)

pub mod http;

pub use http::{ByteStream, FilePart, Headers, HttpClient, HttpError, Response, StreamResponse};
