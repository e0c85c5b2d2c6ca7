//! Streaming-related error types.
//!
//! These cover everything after the HTTP exchange succeeded: a missing or
//! unreadable body, `error` records sent by the backend, records the decoder
//! could not make sense of, and streams that went quiet.

use thiserror::Error;

/// Stream-specific error variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The response carried no readable body. Fatal to the turn.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The backend sent an `{"error": ...}` record.
    #[error("{message}")]
    ServerSignaled { message: String },

    /// A `data: ` record whose payload was not a usable event.
    ///
    /// The decoder drops these; the variant exists so the drop can be
    /// described in logs.
    #[error("Malformed record ({reason}): {line}")]
    MalformedRecord { line: String, reason: String },

    /// No bytes arrived within the configured idle timeout.
    #[error("Stream idle for {duration_secs} seconds")]
    IdleTimeout { duration_secs: u64 },
}

impl StreamError {
    /// Whether this error ends the current turn.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamError::MalformedRecord { .. })
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::Protocol { .. } => {
                "The backend response could not be read as a stream.".to_string()
            }
            StreamError::ServerSignaled { message } => message.clone(),
            StreamError::MalformedRecord { .. } => {
                "Received an unreadable record from the backend.".to_string()
            }
            StreamError::IdleTimeout { duration_secs } => format!(
                "No response from the backend for {} seconds.",
                duration_secs
            ),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::Protocol { .. } => "E_STREAM_PROTOCOL",
            StreamError::ServerSignaled { .. } => "E_STREAM_SERVER",
            StreamError::MalformedRecord { .. } => "E_STREAM_RECORD",
            StreamError::IdleTimeout { .. } => "E_STREAM_TIMEOUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_signaled_displays_raw_message() {
        let err = StreamError::ServerSignaled {
            message: "Collection docs not found".to_string(),
        };
        assert_eq!(err.to_string(), "Collection docs not found");
        assert_eq!(err.user_message(), "Collection docs not found");
    }

    #[test]
    fn test_malformed_record_is_not_terminal() {
        let err = StreamError::MalformedRecord {
            line: "data: {oops".to_string(),
            reason: "invalid JSON".to_string(),
        };
        assert!(!err.is_terminal());
        assert!(StreamError::Protocol {
            message: "no body".to_string()
        }
        .is_terminal());
        assert!(StreamError::IdleTimeout { duration_secs: 30 }.is_terminal());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StreamError::IdleTimeout { duration_secs: 5 }.error_code(),
            "E_STREAM_TIMEOUT"
        );
        assert_eq!(
            StreamError::Protocol {
                message: String::new()
            }
            .error_code(),
            "E_STREAM_PROTOCOL"
        );
    }
}
