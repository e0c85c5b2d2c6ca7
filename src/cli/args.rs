//! Command-line argument parsing for ragchat.
//!
//! This module handles parsing command-line arguments and determining
//! which CLI command to execute.

use std::path::PathBuf;

/// Usage text printed by `--help` and on argument errors.
pub const USAGE: &str = "\
Usage: ragchat [COMMAND]

Commands:
  chat [--collection NAME]                  Interactive chat (default)
  collections [list]                        List collections
  collections create NAME                   Create a collection
  collections delete NAME                   Delete a collection
  collections show NAME                     Show a collection
  documents NAME [list]                     List documents in a collection
  documents NAME upload PATH [--force]      Upload and index a document
  documents NAME delete DOC                 Delete a document
  health                                    Check the backend

Options:
  -h, --help       Print help
  -V, --version    Print version

Chat commands:
  /collections     List collections
  /use NAME        Switch collection
  /history         Show the conversation so far
  /clear           Start a new conversation
  /quit            Exit";

/// Collection subcommands.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionsAction {
    List,
    Create(String),
    Delete(String),
    Show(String),
}

/// Document subcommands.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentsAction {
    List,
    Upload { path: PathBuf, force: bool },
    Delete(String),
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Interactive chat loop (default)
    Chat { collection: Option<String> },
    /// Collection management
    Collections(CollectionsAction),
    /// Document management within a collection
    Documents {
        collection: String,
        action: DocumentsAction,
    },
    /// Backend health check
    Health,
    /// Show version information
    Version,
    /// Show usage
    Help,
}

/// Parse command-line arguments and return the appropriate command.
///
/// # Arguments
///
/// * `args` - Iterator of command-line arguments (typically `std::env::args()`)
///
/// # Returns
///
/// The `CliCommand` to execute, or a message describing the bad argument.
///
/// # Examples
///
/// ```
/// use ragchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ragchat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, String>
where
    I: Iterator<Item = String>,
{
    // Skip the program name
    let args: Vec<String> = args.skip(1).collect();
    let rest = args.get(1..).unwrap_or(&[]);

    match args.first().map(String::as_str) {
        None => Ok(CliCommand::Chat { collection: None }),
        Some("--version" | "-V") => Ok(CliCommand::Version),
        Some("--help" | "-h" | "help") => Ok(CliCommand::Help),
        Some("chat") => parse_chat(rest),
        Some("collections") => parse_collections(rest),
        Some("documents") => parse_documents(rest),
        Some("health") => no_more(rest, CliCommand::Health),
        Some(other) => Err(format!("unknown command '{}'", other)),
    }
}

fn no_more(rest: &[String], command: CliCommand) -> Result<CliCommand, String> {
    match rest.first() {
        None => Ok(command),
        Some(extra) => Err(format!("unexpected argument '{}'", extra)),
    }
}

fn parse_chat(rest: &[String]) -> Result<CliCommand, String> {
    match rest {
        [] => Ok(CliCommand::Chat { collection: None }),
        [flag, name] if flag == "--collection" || flag == "-c" => Ok(CliCommand::Chat {
            collection: Some(name.clone()),
        }),
        [flag] if flag == "--collection" || flag == "-c" => {
            Err("--collection requires a name".to_string())
        }
        [other, ..] => Err(format!("unexpected argument '{}'", other)),
    }
}

fn parse_collections(rest: &[String]) -> Result<CliCommand, String> {
    let action = match rest.first().map(String::as_str) {
        None | Some("list") => return no_more(rest.get(1..).unwrap_or(&[]), list_collections()),
        Some("create") => CollectionsAction::Create(required(rest, "collection name")?),
        Some("delete") => CollectionsAction::Delete(required(rest, "collection name")?),
        Some("show") => CollectionsAction::Show(required(rest, "collection name")?),
        Some(other) => return Err(format!("unknown collections action '{}'", other)),
    };
    no_more(&rest[2..], CliCommand::Collections(action))
}

fn list_collections() -> CliCommand {
    CliCommand::Collections(CollectionsAction::List)
}

fn parse_documents(rest: &[String]) -> Result<CliCommand, String> {
    let collection = rest
        .first()
        .cloned()
        .ok_or_else(|| "documents requires a collection name".to_string())?;
    let rest = &rest[1..];

    let action = match rest.first().map(String::as_str) {
        None | Some("list") => {
            return no_more(
                rest.get(1..).unwrap_or(&[]),
                CliCommand::Documents {
                    collection,
                    action: DocumentsAction::List,
                },
            )
        }
        Some("upload") => {
            let mut path = None;
            let mut force = false;
            for arg in &rest[1..] {
                match arg.as_str() {
                    "--force" | "-f" => force = true,
                    _ if path.is_none() => path = Some(PathBuf::from(arg)),
                    _ => return Err(format!("unexpected argument '{}'", arg)),
                }
            }
            let path = path.ok_or_else(|| "upload requires a file path".to_string())?;
            return Ok(CliCommand::Documents {
                collection,
                action: DocumentsAction::Upload { path, force },
            });
        }
        Some("delete") => DocumentsAction::Delete(required(rest, "document name")?),
        Some(other) => return Err(format!("unknown documents action '{}'", other)),
    };
    no_more(&rest[2..], CliCommand::Documents { collection, action })
}

/// The argument after the action word.
fn required(rest: &[String], what: &str) -> Result<String, String> {
    rest.get(1)
        .cloned()
        .ok_or_else(|| format!("{} requires a {}", rest[0], what))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand, String> {
        let mut full = vec!["ragchat".to_string()];
        full.extend(args.iter().map(|s| s.to_string()));
        parse_args(full.into_iter())
    }

    #[test]
    fn test_no_args_starts_chat() {
        assert_eq!(parse(&[]), Ok(CliCommand::Chat { collection: None }));
    }

    #[test]
    fn test_parse_version_flags() {
        assert_eq!(parse(&["--version"]), Ok(CliCommand::Version));
        assert_eq!(parse(&["-V"]), Ok(CliCommand::Version));
    }

    #[test]
    fn test_parse_help_flags() {
        assert_eq!(parse(&["--help"]), Ok(CliCommand::Help));
        assert_eq!(parse(&["-h"]), Ok(CliCommand::Help));
    }

    #[test]
    fn test_parse_chat_with_collection() {
        assert_eq!(
            parse(&["chat", "--collection", "manuals"]),
            Ok(CliCommand::Chat {
                collection: Some("manuals".to_string())
            })
        );
        assert!(parse(&["chat", "--collection"]).is_err());
    }

    #[test]
    fn test_parse_collections() {
        assert_eq!(parse(&["collections"]), Ok(list_collections()));
        assert_eq!(parse(&["collections", "list"]), Ok(list_collections()));
        assert_eq!(
            parse(&["collections", "create", "docs"]),
            Ok(CliCommand::Collections(CollectionsAction::Create(
                "docs".to_string()
            )))
        );
        assert_eq!(
            parse(&["collections", "show", "docs"]),
            Ok(CliCommand::Collections(CollectionsAction::Show(
                "docs".to_string()
            )))
        );
        assert!(parse(&["collections", "delete"]).is_err());
        assert!(parse(&["collections", "create", "a", "b"]).is_err());
    }

    #[test]
    fn test_parse_documents() {
        assert_eq!(
            parse(&["documents", "docs"]),
            Ok(CliCommand::Documents {
                collection: "docs".to_string(),
                action: DocumentsAction::List,
            })
        );
        assert_eq!(
            parse(&["documents", "docs", "upload", "guide.pdf", "--force"]),
            Ok(CliCommand::Documents {
                collection: "docs".to_string(),
                action: DocumentsAction::Upload {
                    path: PathBuf::from("guide.pdf"),
                    force: true,
                },
            })
        );
        assert_eq!(
            parse(&["documents", "docs", "delete", "guide.pdf"]),
            Ok(CliCommand::Documents {
                collection: "docs".to_string(),
                action: DocumentsAction::Delete("guide.pdf".to_string()),
            })
        );
        assert!(parse(&["documents"]).is_err());
        assert!(parse(&["documents", "docs", "upload"]).is_err());
    }

    #[test]
    fn test_unknown_arguments() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["health", "now"]).is_err());
        assert_eq!(parse(&["health"]), Ok(CliCommand::Health));
    }
}
