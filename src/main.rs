//! bb-release command line
//!
//! Feeds a chat message to the release event and prints the reply.

mod cli;

use anstream::eprintln;
use bb_release::config::load_config;
use clap::{Parser, Subcommand};
use cli::style::Stylize;
use cli::{ReleaseOptions, run_describe, run_release_command};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Release Bitbucket pull requests linked from chat messages
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "BB_RELEASE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Release the pull requests linked in a message
    Release {
        /// Channel the message was posted in
        #[arg(long, default_value = "")]
        channel: String,

        /// Slack user id of the requester
        #[arg(long, default_value = "")]
        user: String,

        /// Evaluate and show the plan without merging anything
        #[arg(long)]
        dry_run: bool,

        /// Message text (read from stdin when omitted)
        text: Vec<String>,
    },
    /// Print the event registration
    Describe,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("{} {e}", "error:".warn());
            ExitCode::from(1)
        }
    }
}

/// Compact fmt layer on stderr, filtered by `RUST_LOG` (default `info`)
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn run(cli: Cli) -> bb_release::error::Result<bool> {
    match cli.command {
        Commands::Describe => {
            run_describe();
            Ok(true)
        }
        Commands::Release {
            channel,
            user,
            dry_run,
            text,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let options = ReleaseOptions {
                channel,
                user,
                dry_run,
                text,
            };
            run_release_command(&config, options).await
        }
    }
}
