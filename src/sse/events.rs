//! Typed events carried by the chat stream.
//!
//! Each `data: ` record holds one JSON object with optional `token`,
//! `done`, `sources` and `error` fields. A record yields one
//! [`StreamEvent`], or two when it carries a final `token` together with
//! `done`.

use serde::{Deserialize, Serialize};

use crate::models::Source;

/// A decoded chat stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamEvent {
    /// Next piece of the answer
    Token(String),
    /// Answer finished; carries the cited sources
    Done { sources: Vec<Source> },
    /// Backend failed while answering
    Error { message: String },
}

impl StreamEvent {
    /// Terminal events end the turn: nothing after them is folded.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token(_))
    }

    /// Returns the event type name for logging.
    pub fn event_type_name(&self) -> &'static str {
        match self {
            StreamEvent::Token(_) => "token",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }
}

/// Record payload exactly as the backend writes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RecordPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RecordPayload {
    /// Resolve the payload to events, in folding order.
    ///
    /// `error` replaces everything else. Otherwise a `token` comes first and
    /// `done` closes the turn after it. A payload with none of them yields
    /// no event.
    pub(crate) fn into_events(self) -> Vec<StreamEvent> {
        if let Some(message) = self.error {
            return vec![StreamEvent::Error { message }];
        }
        let mut events: Vec<StreamEvent> = self.token.map(StreamEvent::Token).into_iter().collect();
        if self.done == Some(true) {
            events.push(StreamEvent::Done {
                sources: self.sources.unwrap_or_default(),
            });
        }
        events
    }
}
