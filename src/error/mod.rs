//! Error handling for ragchat.
//!
//! | Kind | Type | Effect |
//! |------|------|--------|
//! | ProtocolError | [`StreamError::Protocol`] | ends the turn immediately |
//! | TransportError | [`NetworkError`] | ends the turn, rendered inline |
//! | ServerSignaledError | [`StreamError::ServerSignaled`] | ends the turn, rendered inline |
//! | MalformedRecord | [`StreamError::MalformedRecord`] | dropped by the decoder |
//!
//! Nothing is retried automatically. After a turn error the conversation
//! stays usable for the next question.

mod category;
mod chat_error;
mod network;
mod result;
mod stream;

pub use category::ErrorCategory;
pub use chat_error::ChatError;
pub use network::{classify_http_error, extract_detail, NetworkError};
pub use result::ChatResult;
pub use stream::StreamError;
