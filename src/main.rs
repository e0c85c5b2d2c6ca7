use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use ragchat::cli::{parse_args, run_cli_command, CliCommand, USAGE};
use ragchat::config::ClientConfig;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "RAGCHAT_LOG";

/// Log to stderr so diagnostics never interleave with a streamed answer.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("ragchat=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = match parse_args(std::env::args()) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("error: {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    let config = match command {
        CliCommand::Version | CliCommand::Help => ClientConfig::default(),
        _ => ClientConfig::load().wrap_err("Failed to load configuration")?,
    };
    tracing::debug!(?config, "Configuration loaded");

    run_cli_command(command, config).await
}
