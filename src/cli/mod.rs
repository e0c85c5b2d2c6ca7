//! CLI module for ragchat.
//!
//! This module provides the command-line interface:
//! - Argument parsing
//! - Interactive chat loop
//! - Collection and document management
//! - Health and version display
//!
//! # Usage
//!
//! ```ignore
//! use ragchat::cli::{parse_args, run_cli_command};
//! use ragchat::config::ClientConfig;
//!
//! let command = parse_args(std::env::args())?;
//! run_cli_command(command, ClientConfig::load()?).await?;
//! ```

pub mod admin;
pub mod args;
pub mod chat;
pub mod version;

pub use args::{parse_args, CliCommand, CollectionsAction, DocumentsAction, USAGE};
pub use chat::{parse_chat_line, run_chat, ChatInput};
pub use version::{handle_version_command, VERSION};

use color_eyre::Result;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::session::ChatSession;

/// Run a parsed CLI command against the configured backend.
pub async fn run_cli_command(command: CliCommand, config: ClientConfig) -> Result<()> {
    let api = ApiClient::from_config(&config);
    tracing::debug!("Using backend {}", api.base_url);

    match command {
        CliCommand::Version => {
            handle_version_command();
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Health => admin::handle_health(&api).await,
        CliCommand::Collections(action) => admin::handle_collections(&api, action).await,
        CliCommand::Documents { collection, action } => {
            admin::handle_documents(&api, &collection, action).await
        }
        CliCommand::Chat { collection } => {
            let mut session = ChatSession::from_config(api, &config);
            if let Some(collection) = collection {
                session.set_collection(collection);
            }
            run_chat(session).await
        }
    }
}
