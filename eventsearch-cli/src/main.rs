use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod commands;
mod utils;

use commands::search::SearchCommands;

/// eventsearch - Search audit events stored in PostgreSQL or MySQL
#[derive(Parser)]
#[command(name = "eventsearch")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Store connection overrides
///
/// Values given here take precedence over the configuration files.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// Configuration file (defaults to the standard search path)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database driver (postgres or mysql)
    #[arg(long, global = true, env = "EVENTSEARCH_DRIVER", value_name = "DRIVER")]
    driver: Option<String>,

    /// Database connection string
    #[arg(
        long,
        global = true,
        env = "EVENTSEARCH_DSN",
        hide_env_values = true,
        value_name = "DSN"
    )]
    dsn: Option<String>,

    /// MySQL custom TLS settings as a query string
    #[arg(long, global = true, env = "EVENTSEARCH_CUSTOM_TLS", value_name = "QUERY")]
    custom_tls: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the store and report pool health
    Check,
    /// Run a single search and print the page as JSON
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },
}

/// Exit status for a failed command: 2 for rejected search requests, 1 otherwise
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<eventsearch::Error>() {
        Some(e) if e.is_request_error() => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match utils::load_config(&cli.store) {
        Ok(config) => match cli.command {
            Commands::Check => commands::check::execute(config).await,
            Commands::Search { command } => commands::search::execute(config, command).await,
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);

            if let Some(source) = e.source() {
                eprintln!("\n{} {}", "Caused by:".yellow(), source);
            }

            std::process::exit(exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_code_for_rejected_requests() {
        let rejected: anyhow::Result<()> =
            Err(eventsearch::Error::MissingLimit).context("Search failed");
        assert_eq!(exit_code(&rejected.unwrap_err()), 2);

        let config: anyhow::Result<()> =
            Err(eventsearch::Error::UnsupportedDriver("sqlite".into())).context("Search failed");
        assert_eq!(exit_code(&config.unwrap_err()), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("DSN is empty")), 1);
    }
}
