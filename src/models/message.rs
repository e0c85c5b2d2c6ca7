use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix written in front of a turn error in the assistant bubble.
pub const ERROR_PREFIX: &str = "Error: ";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Page reference of a cited chunk. The backend sends either a page number
/// (integer or float, e.g. `3` or `3.0`) or a label such as `"iv"` or `"N/A"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PageRef {
    Number(serde_json::Number),
    Label(String),
}

impl PageRef {
    /// Integer page number.
    pub fn number(page: i64) -> Self {
        PageRef::Number(page.into())
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Number(n) => match n.as_f64() {
                // Whole floats print like integers: 2.0 -> 2
                Some(x) if !n.is_i64() && !n.is_u64() && x.is_finite() && x.fract() == 0.0 => {
                    write!(f, "{:.0}", x)
                }
                _ => write!(f, "{}", n),
            },
            PageRef::Label(s) => write!(f, "{}", s),
        }
    }
}

/// A document chunk cited by an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    /// Source file name. The backend calls this field `fichier`.
    #[serde(rename = "fichier", alias = "file")]
    pub file: String,
    pub page: PageRef,
    pub score: f64,
}

/// `{role, content}` pair sent back to the backend as conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

/// A message in the conversation.
///
/// `content` only grows while `streaming` is true. Once `streaming` is
/// false the message is frozen: every mutator below becomes a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Unique id assigned at creation
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Cited sources, attached by the `done` record
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    /// Whether tokens are still arriving for this message
    #[serde(default)]
    pub streaming: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: String, streaming: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            sources: None,
            streaming,
            created_at: Utc::now(),
        }
    }

    /// A finished user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), false)
    }

    /// An empty assistant message waiting for its first token.
    pub fn assistant_placeholder() -> Self {
        Self::new(Role::Assistant, String::new(), true)
    }

    /// Append a streamed token.
    pub fn append_token(&mut self, token: &str) {
        if self.streaming {
            self.content.push_str(token);
        }
    }

    /// Attach the cited sources and stop streaming.
    pub fn complete(&mut self, sources: Vec<Source>) {
        if self.streaming {
            self.sources = Some(sources);
            self.streaming = false;
        }
    }

    /// Replace the content with an error notice and stop streaming.
    pub fn fail(&mut self, message: &str) {
        if self.streaming {
            self.content = format!("{}{}", ERROR_PREFIX, message);
            self.streaming = false;
        }
    }

    /// Stop streaming, keeping whatever content arrived.
    pub fn finalize(&mut self) {
        self.streaming = false;
    }

    /// History form of this message, if it belongs in the history.
    ///
    /// In-flight and empty messages are left out.
    pub fn to_history(&self) -> Option<HistoryEntry> {
        if self.streaming || self.content.is_empty() {
            return None;
        }
        Some(HistoryEntry {
            role: self.role,
            content: self.content.clone(),
        })
    }
}
