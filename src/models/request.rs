use serde::{Deserialize, Serialize};

use super::message::HistoryEntry;

/// Prompt template used when none is configured.
pub const DEFAULT_PROMPT_NAME: &str = "defaut";

/// Body of `POST /api/chat` and `POST /api/chat/sync`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The question being asked
    pub message: String,
    /// Collection searched for context
    pub collection_name: String,
    /// Prompt template name on the backend
    pub prompt_name: String,
    /// Earlier finished messages, oldest first
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ChatRequest {
    /// Create a request with the default prompt and no history.
    pub fn new(message: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            collection_name: collection_name.into(),
            prompt_name: DEFAULT_PROMPT_NAME.to_string(),
            history: Vec::new(),
        }
    }

    /// Set the prompt template (builder pattern)
    pub fn with_prompt(mut self, prompt_name: impl Into<String>) -> Self {
        self.prompt_name = prompt_name.into();
        self
    }

    /// Set the conversation history (builder pattern)
    pub fn with_history(mut self, history: Vec<HistoryEntry>) -> Self {
        self.history = history;
        self
    }
}
