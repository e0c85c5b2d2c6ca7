//! Error category classification.
//!
//! Categories drive how an error is presented: whether it ends a chat turn
//! with an inline message, whether the user has to fix something first, and
//! whether trying again later is likely to help.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (connection refused, timeout, dropped stream).
    Network,

    /// The backend reported a failure (HTTP 5xx or an `error` record).
    Server,

    /// Client-side errors (protocol violations, unexpected payloads).
    Client,

    /// User action required (invalid collection name, no collection selected).
    User,

    /// System/OS errors (filesystem, reading a document to upload).
    System,

    /// Configuration errors (invalid config file or environment value).
    Configuration,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    ///
    /// Nothing in the client retries automatically; this only shapes the
    /// hint shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::User => "user",
            ErrorCategory::System => "system",
            ErrorCategory::Configuration => "configuration",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the chatbot backend is running and reachable",
            ErrorCategory::Server => "The backend may be busy or misconfigured. Try again later",
            ErrorCategory::Client => "This may be a bug. Please report this issue if it persists",
            ErrorCategory::User => "Please check your input and try again",
            ErrorCategory::System => "Check file permissions and that the file exists",
            ErrorCategory::Configuration => "Check ~/.ragchat/config.json and RAGCHAT_* variables",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
