//! Interactive chat loop.
//!
//! Reads questions from stdin and prints the answer as it streams. Ctrl-C
//! during an answer cancels that turn only.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::models::ChatMessage;
use crate::render::{render_collections, render_snapshot, render_sources, rule};
use crate::session::ChatSession;
use crate::traits::HttpClient;

/// One line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatInput {
    Question(String),
    ListCollections,
    History,
    Use(String),
    Clear,
    Quit,
    Empty,
    Unknown(String),
}

/// Classify a line typed at the prompt.
pub fn parse_chat_line(line: &str) -> ChatInput {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if !line.starts_with('/') {
        return ChatInput::Question(line.to_string());
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).unwrap_or_default();
    match (command, arg) {
        ("/collections", "") => ChatInput::ListCollections,
        ("/history", "") => ChatInput::History,
        ("/use", name) if !name.is_empty() => ChatInput::Use(name.to_string()),
        ("/clear", "") => ChatInput::Clear,
        ("/quit" | "/exit", "") => ChatInput::Quit,
        _ => ChatInput::Unknown(line.to_string()),
    }
}

enum Step {
    Updated(bool),
    Interrupted,
}

fn prompt(session: &ChatSession<impl HttpClient + 'static>) {
    let collection = session.collection().unwrap_or("-");
    print!("[{}] > ", collection);
    std::io::stdout().flush().ok();
}

/// Pick the first collection when none is configured.
async fn select_initial_collection<C: HttpClient + 'static>(session: &mut ChatSession<C>) {
    if session.collection().is_some() {
        return;
    }
    match session.api().list_collections().await {
        Ok(names) => match names.into_iter().next() {
            Some(first) => session.set_collection(first),
            None => println!("No collections yet. Create one with `ragchat collections create NAME`."),
        },
        Err(e) => tracing::warn!("Could not fetch collections: {}", e),
    }
}

/// Print the turn in flight until it finishes or the user interrupts it.
async fn stream_answer<C: HttpClient + 'static>(session: &mut ChatSession<C>) {
    let mut shown = String::new();
    print!("Assistant: ");
    std::io::stdout().flush().ok();

    loop {
        let step = tokio::select! {
            more = session.next_update() => Step::Updated(more),
            _ = tokio::signal::ctrl_c() => Step::Interrupted,
        };
        match step {
            Step::Updated(false) => break,
            Step::Updated(true) => {
                let Some(message) = session.conversation().messages().last() else {
                    continue;
                };
                if message.streaming && message.content.starts_with(&shown) {
                    print!("{}", &message.content[shown.len()..]);
                    std::io::stdout().flush().ok();
                    shown = message.content.clone();
                }
            }
            Step::Interrupted => {
                session.cancel().await;
                println!(" [cancelled]");
                return;
            }
        }
    }

    if let Some(message) = session.conversation().messages().last() {
        finish_answer(message, &shown);
    }
    if let Some(banner) = session.conversation().banner() {
        eprintln!("! {}", banner);
    }
}

fn finish_answer(message: &ChatMessage, shown: &str) {
    match message.content.strip_prefix(shown) {
        Some(tail) => println!("{}", tail),
        // Content was replaced by an error notice
        None => println!("\n{}", message.content),
    }
    if let Some(sources) = &message.sources {
        let block = render_sources(sources);
        if !block.is_empty() {
            println!("{}", block);
        }
    }
    println!();
}

/// Run the chat loop until `/quit` or end of input.
pub async fn run_chat<C: HttpClient + 'static>(mut session: ChatSession<C>) -> Result<()> {
    select_initial_collection(&mut session).await;

    println!("ragchat - {}", session.api().base_url);
    println!("{}", rule());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(&session);
        let Some(line) = lines.next_line().await.wrap_err("Failed to read input")? else {
            println!();
            break;
        };

        match parse_chat_line(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Clear => {
                session.clear().await;
                println!("Conversation cleared.");
            }
            ChatInput::Use(name) => {
                session.set_collection(name.clone());
                println!("Using collection '{}'.", name);
            }
            ChatInput::History => {
                let snapshot = session.subscribe().borrow().clone();
                if snapshot.messages.is_empty() {
                    println!("No messages yet.");
                } else {
                    println!("{}\n{}", render_snapshot(&snapshot), rule());
                }
            }
            ChatInput::ListCollections => match session.api().list_collections().await {
                Ok(names) => println!("{}", render_collections(&names)),
                Err(e) => eprintln!("! {}", e.user_message()),
            },
            ChatInput::Unknown(command) => {
                eprintln!("Unknown command '{}'. Try /collections, /use NAME, /history, /clear, /quit.", command);
            }
            ChatInput::Question(text) => match session.submit(&text) {
                Ok(Some(_)) => stream_answer(&mut session).await,
                Ok(None) => {}
                Err(e) => eprintln!("! {}", e.user_message()),
            },
        }
    }

    Ok(())
}
