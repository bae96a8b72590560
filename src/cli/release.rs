//! Release command - run the release event for one message

use crate::cli::style::{Stylize, check};
use anstream::{eprintln, println};
use bb_release::config::Config;
use bb_release::error::{Error, Result};
use bb_release::notify::{DisabledNotifier, Notifier, SlackNotifier};
use bb_release::platform::BitbucketClient;
use bb_release::types::ChatMessage;
use bb_release::{ReleaseOutcome, check_release, run_release};
use chrono::Local;
use std::io::{self, IsTerminal, Read};
use tracing::debug;

/// Options for the release command
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    /// Channel the message was posted in
    pub channel: String,
    /// Slack user id of whoever asked for the release
    pub user: String,
    /// Only evaluate and describe the plan
    pub dry_run: bool,
    /// Message text; read from stdin when empty
    pub text: Vec<String>,
}

/// Run the release command
///
/// Returns `false` when the release reported an error.
pub async fn run_release_command(config: &Config, options: ReleaseOptions) -> Result<bool> {
    let text = message_text(&options.text)?;
    let message = ChatMessage {
        channel: options.channel,
        text,
        user: options.user,
    };

    let platform = BitbucketClient::new(&config.bitbucket)?;

    let outcome = if options.dry_run {
        check_release(&message, &platform, config, Local::now().date_naive()).await
    } else {
        let notifier: Box<dyn Notifier> = match &config.slack.token {
            Some(token) => Box::new(SlackNotifier::new(token.clone())?),
            None => {
                debug!("no Slack token configured, release summaries are not posted");
                Box::new(DisabledNotifier)
            }
        };
        run_release(&message, &platform, notifier.as_ref(), config).await
    };

    print_outcome(&outcome, options.dry_run);
    Ok(outcome.is_success())
}

/// Join the arguments, or read the whole message from stdin
fn message_text(args: &[String]) -> Result<String> {
    if !args.is_empty() {
        return Ok(args.join(" "));
    }

    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Err(Error::Config(
            "no message given; pass it as arguments or on stdin".to_string(),
        ));
    }

    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}

fn print_outcome(outcome: &ReleaseOutcome, dry_run: bool) {
    println!("{}", outcome.text);
    println!();

    match &outcome.error {
        None if dry_run => println!("{}", "Run without --dry-run to execute.".muted()),
        None => println!("{} {}", check(), "Release finished".success()),
        Some(e) => eprintln!("{} {}", "Release failed:".warn(), e),
    }
}
