//! Chat reply formatting
//!
//! Pure functions; listings follow the sorted order of the evaluation maps.

use crate::release::evaluate::FailedPullRequest;
use crate::release::plan::{ReleasePlan, RepositoryStep};
use crate::types::{PullRequestDetail, PullRequestRef};
use std::collections::BTreeMap;

/// Header of the found pull request list
pub const FOUND_PULL_REQUESTS: &str = "I found the next pull-requests:\n";

/// Reply when the message contains no pull request link
pub const NO_PULL_REQUESTS: &str = "I can't find any pull-request in your message";

/// Appended when nothing survived evaluation
pub const NOTHING_TO_RELEASE: &str = "Nothing to release";

/// List the pull requests found in the message
pub fn found_pull_requests_text(found: &[PullRequestRef]) -> String {
    if found.is_empty() {
        return NO_PULL_REQUESTS.to_string();
    }

    let mut text = FOUND_PULL_REQUESTS.to_string();
    for pr in found {
        text.push_str(&format!(
            "Pull-request #{} [repository: {}]\n",
            pr.id, pr.repository_slug
        ));
    }
    text
}

/// List the pull requests which failed evaluation, with their reasons
pub fn failed_pull_requests_text(failed: &BTreeMap<String, FailedPullRequest>) -> String {
    if failed.is_empty() {
        return "All pull-requests are ready for merge! This is awesome!".to_string();
    }

    let mut text = "These pull-requests cannot be merged:\n".to_string();
    for (url, failure) in failed {
        text.push_str(&format!("{url} - {} \n", failure.reason));
    }
    text
}

/// List the pull requests that are going to be merged
pub fn mergeable_pull_requests_text(mergeable: &BTreeMap<String, PullRequestDetail>) -> String {
    if mergeable.is_empty() {
        return "There is no pull-requests, which can be merged.".to_string();
    }

    let mut text = "Next pull-requests is will be merged:\n".to_string();
    for (url, pr) in mergeable {
        text.push_str(&format!("[#{}] {url} \n", pr.id));
    }
    text
}

/// Summary posted to the release channel
pub fn release_notification_text(user: &str, result: &str) -> String {
    format!("The user <@{user}> asked me to start the release and here is the result:{result}")
}

/// Describe what a plan would do, for dry runs
pub fn release_plan_text(plan: &ReleasePlan) -> String {
    let direct = |pr: &PullRequestDetail| {
        format!(
            "I would merge pull-request #{} into `{}` of repository `{}`.\n",
            pr.id, pr.destination_branch, pr.repository_slug
        )
    };

    match plan {
        ReleasePlan::Nothing => format!("{NOTHING_TO_RELEASE}\n"),
        ReleasePlan::Single(pr) => direct(pr),
        ReleasePlan::Repositories(steps) => steps
            .iter()
            .map(|step| match step {
                RepositoryStep::Direct { pull_request, .. } => direct(pull_request),
                RepositoryStep::ReleaseBranch {
                    repository,
                    branch,
                    pull_requests,
                    ..
                } => {
                    let ids: Vec<String> =
                        pull_requests.iter().map(|pr| format!("#{}", pr.id)).collect();
                    format!(
                        "I would move {} of repository `{repository}` onto `{branch}` and open a release pull-request.\n",
                        ids.join(", ")
                    )
                }
            })
            .collect(),
    }
}
