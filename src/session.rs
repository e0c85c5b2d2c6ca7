//! Chat session: drives turns against the backend.
//!
//! `submit` records the turn in the [`Conversation`] and spawns a task that
//! reads the answer stream. The task never touches the conversation: it
//! sends [`TurnMessage`]s, tagged with the turn id, over a channel, and the
//! session owner folds them in with [`ChatSession::next_update`]. All state
//! changes happen on the owner's side, one message at a time.

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapters::ReqwestHttpClient;
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::conversation::{Conversation, ConversationSnapshot, TurnId};
use crate::error::{ChatError, ChatResult};
use crate::models::{ChatMessage, ChatRequest, DEFAULT_PROMPT_NAME};
use crate::sse::StreamEvent;
use crate::traits::HttpClient;

/// Messages sent from a turn task to the session.
#[derive(Debug)]
pub enum TurnMessage {
    /// A decoded stream event
    Event { turn: TurnId, event: StreamEvent },
    /// The request or the stream failed
    Failed { turn: TurnId, error: ChatError },
    /// The stream ended
    Finished { turn: TurnId },
}

impl TurnMessage {
    pub fn turn(&self) -> TurnId {
        match self {
            TurnMessage::Event { turn, .. }
            | TurnMessage::Failed { turn, .. }
            | TurnMessage::Finished { turn } => *turn,
        }
    }
}

/// A conversation bound to a backend and a collection.
pub struct ChatSession<C: HttpClient + 'static = ReqwestHttpClient> {
    api: ApiClient<C>,
    conversation: Conversation,
    collection: Option<String>,
    prompt_name: String,
    message_tx: mpsc::UnboundedSender<TurnMessage>,
    message_rx: mpsc::UnboundedReceiver<TurnMessage>,
    task: Option<JoinHandle<()>>,
}

impl<C: HttpClient + 'static> ChatSession<C> {
    pub fn new(api: ApiClient<C>) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        Self {
            api,
            conversation: Conversation::new(),
            collection: None,
            prompt_name: DEFAULT_PROMPT_NAME.to_string(),
            message_tx,
            message_rx,
            task: None,
        }
    }

    /// Session using the configured prompt and default collection.
    pub fn from_config(api: ApiClient<C>, config: &ClientConfig) -> Self {
        let mut session = Self::new(api).with_prompt_name(config.prompt_name.clone());
        session.collection = config.default_collection.clone();
        session
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_prompt_name(mut self, prompt_name: impl Into<String>) -> Self {
        self.prompt_name = prompt_name.into();
        self
    }

    pub fn api(&self) -> &ApiClient<C> {
        &self.api
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.conversation.subscribe()
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Select the collection used by the next turn.
    pub fn set_collection(&mut self, collection: impl Into<String>) {
        self.collection = Some(collection.into());
    }

    pub fn in_flight(&self) -> bool {
        self.conversation.in_flight()
    }

    /// Start a turn and return without waiting for the answer.
    ///
    /// Returns `Ok(None)` for whitespace-only text.
    pub fn submit(&mut self, text: &str) -> ChatResult<Option<TurnId>> {
        let Some(start) = self
            .conversation
            .begin_turn(text, self.collection.as_deref())?
        else {
            return Ok(None);
        };

        let collection = self.collection.clone().unwrap_or_default();
        let request = ChatRequest::new(start.message, collection)
            .with_prompt(self.prompt_name.clone())
            .with_history(start.history);

        tracing::info!(
            "Turn {} started (collection={}, history={})",
            start.id,
            request.collection_name,
            request.history.len()
        );

        let api = self.api.clone();
        let message_tx = self.message_tx.clone();
        let turn = start.id;
        self.task = Some(tokio::spawn(async move {
            drive_turn(api, request, turn, message_tx).await;
        }));

        Ok(Some(turn))
    }

    /// Fold the next message from the turn task.
    ///
    /// Returns false immediately when no turn is in flight.
    pub async fn next_update(&mut self) -> bool {
        if !self.conversation.in_flight() {
            return false;
        }
        match self.message_rx.recv().await {
            Some(message) => {
                self.fold(message);
                true
            }
            None => false,
        }
    }

    /// Fold messages until the turn in flight is finished.
    ///
    /// Returns the assistant message of the turn.
    pub async fn run_turn(&mut self) -> Option<ChatMessage> {
        while self.next_update().await {}
        self.conversation.messages().last().cloned()
    }

    /// Submit and wait for the answer.
    pub async fn ask(&mut self, text: &str) -> ChatResult<Option<ChatMessage>> {
        match self.submit(text)? {
            Some(_) => Ok(self.run_turn().await),
            None => Ok(None),
        }
    }

    fn fold(&mut self, message: TurnMessage) {
        match message {
            TurnMessage::Event { turn, event } => {
                self.conversation.apply(turn, event);
            }
            TurnMessage::Failed { turn, error } => {
                self.conversation.fail_turn(turn, &error);
            }
            TurnMessage::Finished { turn } => {
                self.conversation.finish_stream(turn);
            }
        }
        if !self.conversation.in_flight() {
            // The task exits on its own after a terminal message
            self.task = None;
        }
    }

    /// Abort the turn in flight and release its connection.
    ///
    /// The assistant message keeps whatever content arrived.
    pub async fn cancel(&mut self) -> bool {
        if let Some(task) = self.task.take() {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::warn!("Turn task failed: {}", e);
                }
            }
        }
        self.conversation.cancel_turn().is_some()
    }

    /// Cancel any turn and start an empty conversation.
    pub async fn clear(&mut self) {
        self.cancel().await;
        self.conversation.clear();
    }
}

impl<C: HttpClient + 'static> Drop for ChatSession<C> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Read one turn's stream and forward it to the session.
///
/// Stops after the first terminal event; returning drops the stream and
/// releases the connection.
async fn drive_turn<C: HttpClient>(
    api: ApiClient<C>,
    request: ChatRequest,
    turn: TurnId,
    message_tx: mpsc::UnboundedSender<TurnMessage>,
) {
    let mut events = match api.stream_chat(&request).await {
        Ok(events) => events,
        Err(error) => {
            let _ = message_tx.send(TurnMessage::Failed { turn, error });
            return;
        }
    };

    while let Some(item) = events.next().await {
        match item {
            Ok(event) => {
                let terminal = event.is_terminal();
                if message_tx.send(TurnMessage::Event { turn, event }).is_err() || terminal {
                    return;
                }
            }
            Err(error) => {
                let _ = message_tx.send(TurnMessage::Failed { turn, error });
                return;
            }
        }
    }

    let _ = message_tx.send(TurnMessage::Finished { turn });
}
