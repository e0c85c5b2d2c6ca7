//! Plain-text rendering.
//!
//! Every function here is pure: it takes a message, a snapshot or an API
//! payload and returns the text to print.

use crate::conversation::ConversationSnapshot;
use crate::models::{ChatMessage, DocumentInfo, HealthReport, Role, Source};

/// Line width for separators.
const LINE_WIDTH: usize = 60;

/// Shown for an assistant message that has no content yet.
pub const PENDING_MARKER: &str = "...";

/// Separator line.
pub fn rule() -> String {
    "─".repeat(LINE_WIDTH)
}

/// Text shown in a message bubble.
pub fn message_body(message: &ChatMessage) -> &str {
    if message.content.is_empty() && message.streaming {
        PENDING_MARKER
    } else {
        &message.content
    }
}

/// One cited source.
///
/// ```text
/// manuel.pdf - p.12 (score: 0.87)
/// ```
pub fn render_source(source: &Source) -> String {
    format!("{} - p.{} (score: {})", source.file, source.page, source.score)
}

/// The sources block of an answer. Empty when there is nothing to cite.
pub fn render_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return String::new();
    }
    let mut out = String::from("Sources:");
    for source in sources {
        out.push_str("\n  ");
        out.push_str(&render_source(source));
    }
    out
}

/// A full message with its role label and sources.
pub fn render_message(message: &ChatMessage) -> String {
    let label = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    let mut out = format!("{}: {}", label, message_body(message));
    if let Some(sources) = &message.sources {
        let block = render_sources(sources);
        if !block.is_empty() {
            out.push('\n');
            out.push_str(&block);
        }
    }
    out
}

/// The whole conversation, banner last.
pub fn render_snapshot(snapshot: &ConversationSnapshot) -> String {
    let mut blocks: Vec<String> = snapshot.messages.iter().map(render_message).collect();
    if let Some(banner) = &snapshot.banner {
        blocks.push(format!("! {}", banner));
    }
    blocks.join("\n\n")
}

pub fn render_collections(names: &[String]) -> String {
    if names.is_empty() {
        return "No collections.".to_string();
    }
    names
        .iter()
        .map(|name| format!("  {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Documents as an aligned table.
pub fn render_documents(documents: &[DocumentInfo]) -> String {
    if documents.is_empty() {
        return "No documents.".to_string();
    }
    let width = documents
        .iter()
        .map(|d| d.nom.chars().count())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut lines = vec![format!(
        "{:<width$}  {:>6}  {:>6}  {}",
        "NAME",
        "PAGES",
        "CHUNKS",
        "DATE",
        width = width
    )];
    for doc in documents {
        lines.push(format!(
            "{:<width$}  {:>6}  {:>6}  {}",
            doc.nom,
            doc.nb_pages,
            doc.nb_chunks,
            doc.date,
            width = width
        ));
    }
    lines.join("\n")
}

pub fn render_health(report: &HealthReport) -> String {
    let mut lines = vec![format!("Status:   {}", report.status)];
    if let Some(data) = &report.data {
        lines.push(format!("Ollama:   {}", data.ollama));
        lines.push(format!("ChromaDB: {}", data.chromadb));
        lines.push(format!("GPU:      {}", data.gpu));
    }
    if let Some(message) = &report.message {
        lines.push(format!("Note:     {}", message));
    }
    lines.join("\n")
}
