//! Unified error type for ragchat.

use std::path::PathBuf;

use thiserror::Error;

use super::category::ErrorCategory;
use super::network::NetworkError;
use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type for the client.
///
/// Turn-level failures (`Network`, `Stream`) end the current turn and are
/// rendered inline in the assistant message. The remaining variants are
/// raised before any request goes out.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport failures: connection, timeout, non-success status.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Stream failures: missing body, server-signaled error, idle timeout.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// A precondition on user input was not met.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration could not be loaded.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Reading a local file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ChatError {
    /// Shorthand for an [`ChatError::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ChatError::InvalidInput {
            message: message.into(),
        }
    }

    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Network(NetworkError::HttpStatus { status, .. }) if *status >= 500 => {
                ErrorCategory::Server
            }
            ChatError::Network(NetworkError::HttpStatus { .. }) => ErrorCategory::User,
            ChatError::Network(_) => ErrorCategory::Network,
            ChatError::Stream(StreamError::ServerSignaled { .. }) => ErrorCategory::Server,
            ChatError::Stream(StreamError::IdleTimeout { .. }) => ErrorCategory::Network,
            ChatError::Stream(_) => ErrorCategory::Client,
            ChatError::InvalidInput { .. } => ErrorCategory::User,
            ChatError::Config { .. } => ErrorCategory::Configuration,
            ChatError::Io { .. } => ErrorCategory::System,
        }
    }

    /// Check if this error is transient. Informational only.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Network(err) => err.is_retryable(),
            ChatError::Stream(StreamError::IdleTimeout { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Network(err) => err.user_message(),
            ChatError::Stream(err) => err.user_message(),
            ChatError::InvalidInput { message } => message.clone(),
            ChatError::Config { message } => format!("Configuration problem: {}", message),
            ChatError::Io { path, source } => {
                format!("Could not read {}: {}", path.display(), source)
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Network(err) => err.error_code(),
            ChatError::Stream(err) => err.error_code(),
            ChatError::InvalidInput { .. } => "E_INPUT",
            ChatError::Config { .. } => "E_CONFIG",
            ChatError::Io { .. } => "E_IO",
        }
    }

    /// Get the recovery hint for this error.
    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl From<HttpError> for ChatError {
    fn from(err: HttpError) -> Self {
        ChatError::Network(super::network::classify_http_error(err, "unknown"))
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let err: ChatError = NetworkError::ConnectionFailed {
            url: "http://localhost:8000".to_string(),
            message: "refused".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Network);

        let err: ChatError = NetworkError::HttpStatus {
            status: 502,
            message: String::new(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Server);

        let err: ChatError = NetworkError::HttpStatus {
            status: 409,
            message: "exists".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::User);

        let err: ChatError = StreamError::ServerSignaled {
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Server);

        let err: ChatError = StreamError::Protocol {
            message: "no body".to_string(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Client);

        assert_eq!(
            ChatError::invalid_input("empty").category(),
            ErrorCategory::User
        );
        assert_eq!(
            ChatError::Config {
                message: "bad".to_string()
            }
            .category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_transparent_display() {
        let err: ChatError = NetworkError::HttpStatus {
            status: 500,
            message: String::new(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP error: 500");

        let err: ChatError = StreamError::ServerSignaled {
            message: "Internal error: ollama down".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Internal error: ollama down");
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;

        let err = ChatError::Io {
            path: PathBuf::from("/tmp/missing.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("/tmp/missing.pdf"));
        assert_eq!(err.category(), ErrorCategory::System);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(matches!(
            err,
            ChatError::Network(NetworkError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_retry_is_informational() {
        let err: ChatError = StreamError::IdleTimeout { duration_secs: 10 }.into();
        assert!(err.is_retryable());
        assert!(!ChatError::invalid_input("x").is_retryable());
    }
}
