//! Conversation state machine.
//!
//! Owns the ordered message list and folds decoded stream events into the
//! assistant message of the turn in flight. Every change publishes an
//! immutable [`ConversationSnapshot`] on a watch channel, so renderers never
//! share the mutable state.
//!
//! # Turn lifecycle
//!
//! ```text
//! begin_turn ──► [in flight] ──token──► [in flight]
//!                     │
//!                     ├──done────────► finished (sources attached)
//!                     ├──error───────► finished (content = "Error: ...")
//!                     ├──fail_turn───► finished (content = "Error: ...")
//!                     └──finish_stream / cancel ─► finished (partial content)
//! ```
//!
//! Anything addressed to a turn that is no longer in flight is ignored.

use tokio::sync::watch;

use crate::error::{ChatError, ChatResult};
use crate::models::{ChatMessage, HistoryEntry};
use crate::sse::StreamEvent;

/// Identifies one turn within a conversation.
pub type TurnId = u64;

/// Immutable copy of the conversation, published after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSnapshot {
    pub messages: Vec<ChatMessage>,
    /// Whether a turn is waiting for more events
    pub in_flight: bool,
    /// Last turn error, shown until the next submit
    pub banner: Option<String>,
}

/// What a caller needs to send the request for a newly started turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnStart {
    pub id: TurnId,
    /// Trimmed question text
    pub message: String,
    /// Finished messages preceding this turn
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTurn {
    id: TurnId,
    /// Index of the assistant placeholder in `messages`
    index: usize,
}

/// The message list plus the turn currently in flight.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    active: Option<ActiveTurn>,
    next_turn_id: TurnId,
    banner: Option<String>,
    snapshots: watch::Sender<ConversationSnapshot>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(ConversationSnapshot::default());
        Self {
            messages: Vec::new(),
            active: None,
            next_turn_id: 1,
            banner: None,
            snapshots,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a turn's assistant message is still streaming.
    pub fn in_flight(&self) -> bool {
        self.active.is_some()
    }

    /// Id of the turn in flight.
    pub fn active_turn(&self) -> Option<TurnId> {
        self.active.map(|turn| turn.id)
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Finished, non-empty messages as `{role, content}` pairs, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.messages
            .iter()
            .filter_map(ChatMessage::to_history)
            .collect()
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            in_flight: self.in_flight(),
            banner: self.banner.clone(),
        }
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshots.subscribe()
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    /// Start a turn for `text`.
    ///
    /// Whitespace-only text is a no-op and returns `Ok(None)`. Starting a
    /// turn while another is in flight, or without a collection, is refused.
    /// The history is computed before the new messages are appended.
    pub fn begin_turn(
        &mut self,
        text: &str,
        collection: Option<&str>,
    ) -> ChatResult<Option<TurnStart>> {
        let message = text.trim();
        if message.is_empty() {
            return Ok(None);
        }
        if self.in_flight() {
            return Err(ChatError::invalid_input(
                "A question is already being answered",
            ));
        }
        if collection.map_or(true, |c| c.trim().is_empty()) {
            return Err(ChatError::invalid_input("No collection selected"));
        }

        let history = self.history();
        let id = self.next_turn_id;
        self.next_turn_id += 1;

        self.banner = None;
        self.messages.push(ChatMessage::user(message));
        self.messages.push(ChatMessage::assistant_placeholder());
        self.active = Some(ActiveTurn {
            id,
            index: self.messages.len() - 1,
        });
        self.publish();

        Ok(Some(TurnStart {
            id,
            message: message.to_string(),
            history,
        }))
    }

    fn active_message(&mut self, turn: TurnId) -> Option<&mut ChatMessage> {
        match self.active {
            Some(active) if active.id == turn => self.messages.get_mut(active.index),
            _ => None,
        }
    }

    /// Fold one event into the turn's assistant message.
    ///
    /// Returns false when the event was ignored because the turn is no
    /// longer in flight.
    pub fn apply(&mut self, turn: TurnId, event: StreamEvent) -> bool {
        let Some(message) = self.active_message(turn) else {
            tracing::debug!(
                "Ignoring {} event for finished turn {}",
                event.event_type_name(),
                turn
            );
            return false;
        };

        match event {
            StreamEvent::Token(token) => message.append_token(&token),
            StreamEvent::Done { sources } => {
                message.complete(sources);
                self.active = None;
            }
            StreamEvent::Error { message: error } => {
                message.fail(&error);
                self.banner = Some(error);
                self.active = None;
            }
        }
        self.publish();
        true
    }

    /// End the turn with a transport or protocol failure.
    pub fn fail_turn(&mut self, turn: TurnId, error: &ChatError) -> bool {
        let description = error.to_string();
        let Some(message) = self.active_message(turn) else {
            return false;
        };
        tracing::warn!("Turn {} failed: {}", turn, description);
        message.fail(&description);
        self.banner = Some(description);
        self.active = None;
        self.publish();
        true
    }

    /// The event stream ended. A turn still in flight keeps its partial
    /// content and stops streaming.
    pub fn finish_stream(&mut self, turn: TurnId) -> bool {
        let Some(message) = self.active_message(turn) else {
            return false;
        };
        tracing::warn!(
            "Stream for turn {} ended without a terminal record ({} chars kept)",
            turn,
            message.content.len()
        );
        message.finalize();
        self.active = None;
        self.publish();
        true
    }

    /// Stop the turn in flight, keeping its partial content.
    pub fn cancel_turn(&mut self) -> Option<TurnId> {
        let active = self.active.take()?;
        if let Some(message) = self.messages.get_mut(active.index) {
            message.finalize();
        }
        tracing::debug!("Turn {} cancelled", active.id);
        self.publish();
        Some(active.id)
    }

    /// Drop every message. A turn in flight is cancelled first.
    pub fn clear(&mut self) {
        self.active = None;
        self.messages.clear();
        self.banner = None;
        self.publish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::models::{PageRef, Role, Source};

    fn start(conv: &mut Conversation, text: &str) -> TurnStart {
        conv.begin_turn(text, Some("docs")).unwrap().unwrap()
    }

    fn token(s: &str) -> StreamEvent {
        StreamEvent::Token(s.to_string())
    }

    fn last(conv: &Conversation) -> &ChatMessage {
        conv.messages().last().unwrap()
    }

    #[test]
    fn test_begin_turn_appends_user_and_placeholder() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "  What is a gripper?  ");

        assert_eq!(turn.message, "What is a gripper?");
        assert!(turn.history.is_empty());
        assert_eq!(conv.messages().len(), 2);
        assert_eq!(conv.messages()[0].role, Role::User);
        assert_eq!(conv.messages()[0].content, "What is a gripper?");
        assert_eq!(last(&conv).role, Role::Assistant);
        assert!(last(&conv).streaming);
        assert!(last(&conv).content.is_empty());
        assert!(conv.in_flight());
    }

    #[test]
    fn test_empty_submit_is_noop() {
        let mut conv = Conversation::new();
        assert_eq!(conv.begin_turn("", Some("docs")).unwrap(), None);
        assert_eq!(conv.begin_turn(" \n\t ", Some("docs")).unwrap(), None);
        assert!(conv.messages().is_empty());
    }

    #[test]
    fn test_begin_turn_requires_collection() {
        let mut conv = Conversation::new();
        assert!(conv.begin_turn("hello", None).is_err());
        assert!(conv.begin_turn("hello", Some("")).is_err());
        assert!(conv.messages().is_empty());
    }

    #[test]
    fn test_begin_turn_refused_while_in_flight() {
        let mut conv = Conversation::new();
        start(&mut conv, "first");
        let err = conv.begin_turn("second", Some("docs")).unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput { .. }));
        assert_eq!(conv.messages().len(), 2);
    }

    #[test]
    fn test_tokens_concatenate_in_order() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        for t in ["Le ", "bras ", "porte ", "5 kg."] {
            assert!(conv.apply(turn.id, token(t)));
        }
        assert_eq!(last(&conv).content, "Le bras porte 5 kg.");
        assert!(last(&conv).streaming);
    }

    #[test]
    fn test_done_is_terminal() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        let sources = vec![Source {
            file: "fiche.pdf".to_string(),
            page: PageRef::number(2),
            score: 0.77,
        }];

        conv.apply(turn.id, token("Bonjour"));
        conv.apply(
            turn.id,
            StreamEvent::Done {
                sources: sources.clone(),
            },
        );
        assert!(!conv.apply(turn.id, token(" late")));
        assert!(!conv.apply(
            turn.id,
            StreamEvent::Error {
                message: "late".to_string()
            }
        ));

        let msg = last(&conv);
        assert_eq!(msg.content, "Bonjour");
        assert!(!msg.streaming);
        assert_eq!(msg.sources.as_ref(), Some(&sources));
        assert!(!conv.in_flight());
        assert!(conv.banner().is_none());
    }

    #[test]
    fn test_error_record_overwrites_content_and_sets_banner() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        conv.apply(turn.id, token("partial"));
        conv.apply(
            turn.id,
            StreamEvent::Error {
                message: "Collection docs not found".to_string(),
            },
        );

        assert_eq!(last(&conv).content, "Error: Collection docs not found");
        assert!(!last(&conv).streaming);
        assert_eq!(conv.banner(), Some("Collection docs not found"));
        assert!(!conv.apply(turn.id, token("x")));
    }

    #[test]
    fn test_fail_turn_uses_error_description() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        let err = ChatError::Network(NetworkError::HttpStatus {
            status: 500,
            message: String::new(),
        });
        assert!(conv.fail_turn(turn.id, &err));
        assert_eq!(last(&conv).content, "Error: HTTP error: 500");
        assert_eq!(conv.banner(), Some("HTTP error: 500"));
        assert!(!conv.fail_turn(turn.id, &err));
    }

    #[test]
    fn test_finish_without_terminal_keeps_partial_content() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        conv.apply(turn.id, token("half an ans"));
        assert!(conv.finish_stream(turn.id));

        let msg = last(&conv);
        assert_eq!(msg.content, "half an ans");
        assert!(!msg.streaming);
        assert!(msg.sources.is_none());
        assert!(conv.banner().is_none());
    }

    #[test]
    fn test_stale_turn_events_are_ignored() {
        let mut conv = Conversation::new();
        let first = start(&mut conv, "one");
        conv.cancel_turn();
        let second = start(&mut conv, "two");

        assert!(!conv.apply(first.id, token("stale")));
        assert!(conv.apply(second.id, token("fresh")));
        assert_eq!(conv.messages()[1].content, "");
        assert_eq!(last(&conv).content, "fresh");
    }

    #[test]
    fn test_history_excludes_placeholder_and_empty_messages() {
        let mut conv = Conversation::new();
        let first = start(&mut conv, "one");
        conv.apply(first.id, token("answer one"));
        conv.apply(first.id, StreamEvent::Done { sources: vec![] });

        // Cancelled before any token: empty assistant message
        start(&mut conv, "two");
        conv.cancel_turn();

        let third = start(&mut conv, "three");
        assert_eq!(
            third.history,
            vec![
                HistoryEntry {
                    role: Role::User,
                    content: "one".to_string()
                },
                HistoryEntry {
                    role: Role::Assistant,
                    content: "answer one".to_string()
                },
                HistoryEntry {
                    role: Role::User,
                    content: "two".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_banner_cleared_on_next_submit() {
        let mut conv = Conversation::new();
        let turn = start(&mut conv, "q");
        conv.apply(
            turn.id,
            StreamEvent::Error {
                message: "boom".to_string(),
            },
        );
        assert!(conv.banner().is_some());
        start(&mut conv, "again");
        assert!(conv.banner().is_none());
    }

    #[test]
    fn test_at_most_one_streaming_message() {
        let mut conv = Conversation::new();
        for text in ["a", "b", "c"] {
            let turn = start(&mut conv, text);
            conv.apply(turn.id, token("x"));
            assert_eq!(conv.messages().iter().filter(|m| m.streaming).count(), 1);
            conv.apply(turn.id, StreamEvent::Done { sources: vec![] });
            assert_eq!(conv.messages().iter().filter(|m| m.streaming).count(), 0);
        }
    }

    #[test]
    fn test_subscribers_see_each_fold() {
        let mut conv = Conversation::new();
        let mut rx = conv.subscribe();
        assert!(rx.borrow().messages.is_empty());

        let turn = start(&mut conv, "q");
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().in_flight);

        conv.apply(turn.id, token("Bon"));
        assert_eq!(rx.borrow_and_update().messages[1].content, "Bon");

        conv.apply(turn.id, StreamEvent::Done { sources: vec![] });
        let snapshot = rx.borrow_and_update().clone();
        assert!(!snapshot.in_flight);
        assert!(!snapshot.messages[1].streaming);
    }

    #[test]
    fn test_clear() {
        let mut conv = Conversation::new();
        start(&mut conv, "q");
        conv.clear();
        assert!(conv.messages().is_empty());
        assert!(!conv.in_flight());
    }
}
