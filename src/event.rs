//! Chat event entry point
//!
//! A host (chat bot runtime, CLI) hands over a decoded message together with
//! the Bitbucket service, a notifier and the configuration; nothing is read
//! from global state and nothing outlives the call.

use crate::config::Config;
use crate::error::Error;
use crate::notify::Notifier;
use crate::platform::BitbucketService;
use crate::release::{
    create_release_plan, evaluate_pull_requests, execute_release_plan, extract_pull_requests,
    failed_pull_requests_text, found_pull_requests_text, mergeable_pull_requests_text,
    release_notification_text, release_plan_text, Evaluation, NOTHING_TO_RELEASE,
};
use crate::types::ChatMessage;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

/// Static description consumed by a host event registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventDescription {
    /// Event alias
    pub name: &'static str,
    /// Event version
    pub version: &'static str,
    /// Regex a message must match to trigger the event
    pub trigger: &'static str,
    /// Immediate acknowledgement sent before the release starts
    pub answer: &'static str,
    /// Usage help
    pub help: &'static str,
}

/// The release event
pub const EVENT: EventDescription = EventDescription {
    name: "bitbucket_release",
    version: "1.0.0",
    trigger: "(?im)(release)",
    answer: "Give me a second",
    help: "Write `release` followed by the links of the Bitbucket pull-requests you want to ship. \
           Approved pull-requests are merged; several pull-requests of one repository are \
           collected on a `release/YYYY.MM.DD` branch first.",
};

/// Reply produced for one chat message
#[derive(Debug)]
pub struct ReleaseOutcome {
    /// Text to send back to the chat
    pub text: String,
    /// Set when the run did not complete; `text` is then a partial report
    pub error: Option<Error>,
}

impl ReleaseOutcome {
    /// Check if the release ran to completion
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Header of the reply: what was found, what failed, what will be merged
fn evaluation_text(evaluation: &Evaluation) -> String {
    let mut text = found_pull_requests_text(&evaluation.found);
    text.push('\n');
    text.push_str(&failed_pull_requests_text(&evaluation.failed));
    text.push('\n');
    text.push_str(&mergeable_pull_requests_text(&evaluation.mergeable));
    text
}

/// Release the pull requests linked in `message`, naming release branches
/// after today's local date.
pub async fn run_release(
    message: &ChatMessage,
    platform: &dyn BitbucketService,
    notifier: &dyn Notifier,
    config: &Config,
) -> ReleaseOutcome {
    run_release_on(message, platform, notifier, config, Local::now().date_naive()).await
}

/// Release the pull requests linked in `message` as of `date`.
pub async fn run_release_on(
    message: &ChatMessage,
    platform: &dyn BitbucketService,
    notifier: &dyn Notifier,
    config: &Config,
    date: NaiveDate,
) -> ReleaseOutcome {
    let found = extract_pull_requests(&config.bitbucket.host, &message.text);
    info!(count = found.len(), channel = %message.channel, "received release request");

    let evaluation = evaluate_pull_requests(platform, config, &found).await;
    let mut text = evaluation_text(&evaluation);

    if !evaluation.has_releasable() {
        text.push('\n');
        text.push_str(NOTHING_TO_RELEASE);
        return ReleaseOutcome { text, error: None };
    }

    let plan = create_release_plan(&evaluation, date);
    let report = execute_release_plan(&plan, platform, config).await;

    if let Some(error) = report.error {
        text.push_str(&report.text);
        return ReleaseOutcome {
            text,
            error: Some(error),
        };
    }

    text.push('\n');
    text.push_str(&report.text);

    if let Some(channel) = config.release_channel() {
        debug!(channel, "Send release-confirmation message");
        notifier
            .notify(channel, &release_notification_text(&message.user, &report.text))
            .await;
    }

    ReleaseOutcome { text, error: None }
}

/// Evaluate the linked pull requests and describe the plan without
/// changing anything on Bitbucket.
pub async fn check_release(
    message: &ChatMessage,
    platform: &dyn BitbucketService,
    config: &Config,
    date: NaiveDate,
) -> ReleaseOutcome {
    let found = extract_pull_requests(&config.bitbucket.host, &message.text);
    let evaluation = evaluate_pull_requests(platform, config, &found).await;

    let mut text = evaluation_text(&evaluation);
    text.push('\n');
    text.push_str(&release_plan_text(&create_release_plan(&evaluation, date)));

    ReleaseOutcome { text, error: None }
}
