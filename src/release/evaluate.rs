//! Release-readiness evaluation
//!
//! Every extracted reference is looked up on Bitbucket and classified as
//! mergeable or failed. Mergeable pull requests are also grouped by
//! repository so the planner can decide between a direct merge and a
//! release branch.

use crate::config::Config;
use crate::error::Error;
use crate::platform::BitbucketService;
use crate::types::{PrState, PullRequestDetail, PullRequestRef, RequiredReviewer};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Why a pull request failed evaluation
#[derive(Debug)]
pub struct FailedPullRequest {
    /// Human readable reason, shown in the chat reply
    pub reason: String,
    /// Details, when the lookup itself succeeded
    pub detail: Option<PullRequestDetail>,
    /// Lookup error, when there was one
    pub cause: Option<Error>,
}

/// Outcome of evaluating one pull request
#[derive(Debug)]
pub enum ReadinessVerdict {
    /// Passed every policy check
    Mergeable(PullRequestDetail),
    /// Lookup failed or a policy check failed
    Failed(FailedPullRequest),
}

/// A failed release-readiness check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyFailure {
    /// State is something other than `OPEN`
    NotOpen(PrState),
    /// None of the required reviewers participates; holds their mentions
    RequiredReviewerMissing(Vec<String>),
    /// At least one participant hasn't approved
    NotApproved,
}

impl std::fmt::Display for PolicyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOpen(state) => write!(
                f,
                "The state should be {}, instead of it {state} received.",
                PrState::Open
            ),
            Self::RequiredReviewerMissing(mentions) => write!(
                f,
                "One of the required reviewers ({}) was not found in the reviewers list.",
                mentions.join(", ")
            ),
            Self::NotApproved => write!(
                f,
                "The pull-request should be approved by all of the participants."
            ),
        }
    }
}

/// Result of evaluating every reference found in a message
#[derive(Debug, Default)]
pub struct Evaluation {
    /// References in the order they were found
    pub found: Vec<PullRequestRef>,
    /// Mergeable pull requests by display URL
    pub mergeable: BTreeMap<String, PullRequestDetail>,
    /// Mergeable pull requests by repository slug, then title
    pub by_repository: BTreeMap<String, BTreeMap<String, PullRequestDetail>>,
    /// Failed pull requests by display URL
    pub failed: BTreeMap<String, FailedPullRequest>,
}

impl Evaluation {
    /// Record one verdict under its display URL
    pub fn record(&mut self, url: String, verdict: ReadinessVerdict) {
        match verdict {
            ReadinessVerdict::Mergeable(detail) => {
                let group = self
                    .by_repository
                    .entry(detail.repository_slug.clone())
                    .or_default();
                if let Some(previous) = group.insert(detail.title.clone(), detail.clone())
                    && previous.id != detail.id
                {
                    warn!(
                        repository = %detail.repository_slug,
                        title = %detail.title,
                        replaced = previous.id,
                        pull_request_id = detail.id,
                        "Two pull-requests share a title, only the last one is kept for the repository"
                    );
                }
                self.mergeable.insert(url, detail);
            }
            ReadinessVerdict::Failed(failure) => {
                self.failed.insert(url, failure);
            }
        }
    }

    /// Drop mergeable entries whose URL also failed.
    ///
    /// Happens when the same link appears more than once and the lookups
    /// disagree. A repository left without members is dropped entirely.
    pub fn discard_failed(&mut self) {
        if self.failed.is_empty() {
            return;
        }

        let failed_urls: Vec<String> = self.failed.keys().cloned().collect();
        for url in failed_urls {
            let Some(detail) = self.mergeable.remove(&url) else {
                continue;
            };
            debug!(url = %url, "discarding mergeable entry which also failed");

            let Some(group) = self.by_repository.get_mut(&detail.repository_slug) else {
                continue;
            };
            if group
                .get(&detail.title)
                .is_some_and(|member| member.id == detail.id)
            {
                group.remove(&detail.title);
            }
            if group.is_empty() {
                self.by_repository.remove(&detail.repository_slug);
            }
        }
    }

    /// Whether anything is left to release
    pub fn has_releasable(&self) -> bool {
        !self.by_repository.is_empty()
    }
}

/// Canonical display URL of a pull request
pub fn pull_request_url(host: &str, workspace: &str, repository_slug: &str, id: u64) -> String {
    format!("https://{host}/{workspace}/{repository_slug}/pull-requests/{id}")
}

/// Apply the release-readiness policy to fetched details.
///
/// Checks short-circuit in order: state, required reviewer presence,
/// approval by every participant. With no required reviewers configured
/// only the state is checked.
pub fn check_readiness(
    detail: &PullRequestDetail,
    required_reviewers: &[RequiredReviewer],
) -> Result<(), PolicyFailure> {
    if detail.state != PrState::Open {
        return Err(PolicyFailure::NotOpen(detail.state.clone()));
    }

    if required_reviewers.is_empty() {
        return Ok(());
    }

    let reviewer_present = required_reviewers.iter().any(|reviewer| {
        detail
            .participants
            .iter()
            .any(|participant| participant.uuid == reviewer.uuid)
    });
    if !reviewer_present {
        return Err(PolicyFailure::RequiredReviewerMissing(
            required_reviewers
                .iter()
                .map(RequiredReviewer::mention)
                .collect(),
        ));
    }

    if !detail.participants.iter().all(|p| p.approved) {
        return Err(PolicyFailure::NotApproved);
    }

    Ok(())
}

/// Look up one reference and classify it.
///
/// Returns the display URL the verdict is keyed by. When the lookup
/// succeeds the URL is rebuilt with the slug Bitbucket reports.
pub async fn evaluate_pull_request(
    platform: &dyn BitbucketService,
    config: &Config,
    pr_ref: &PullRequestRef,
) -> (String, ReadinessVerdict) {
    let host = &config.bitbucket.host;
    let url = pull_request_url(host, &pr_ref.workspace, &pr_ref.repository_slug, pr_ref.id);

    let mut detail = match platform
        .pull_request_info(&pr_ref.workspace, &pr_ref.repository_slug, pr_ref.id)
        .await
    {
        Ok(detail) => detail,
        Err(e) => {
            warn!(url = %url, error = %e, "Failed to receive the pull-request info");
            return (
                url,
                ReadinessVerdict::Failed(FailedPullRequest {
                    reason: e.to_string(),
                    detail: None,
                    cause: Some(e),
                }),
            );
        }
    };

    detail.description = detail.description.replace('\\', "");
    let url = pull_request_url(host, &pr_ref.workspace, &detail.repository_slug, pr_ref.id);

    match check_readiness(&detail, &config.bitbucket.required_reviewers) {
        Ok(()) => {
            debug!(url = %url, pull_request_id = detail.id, "The pull-request can be merged.");
            (url, ReadinessVerdict::Mergeable(detail))
        }
        Err(failure) => {
            let reason = failure.to_string();
            info!(url = %url, pull_request_id = detail.id, reason = %reason, "The pull-request cannot be merged.");
            (
                url,
                ReadinessVerdict::Failed(FailedPullRequest {
                    reason,
                    detail: Some(detail),
                    cause: None,
                }),
            )
        }
    }
}

/// Evaluate every reference in order, then discard entries that also failed.
pub async fn evaluate_pull_requests(
    platform: &dyn BitbucketService,
    config: &Config,
    refs: &[PullRequestRef],
) -> Evaluation {
    let mut evaluation = Evaluation {
        found: refs.to_vec(),
        ..Evaluation::default()
    };

    for pr_ref in refs {
        let (url, verdict) = evaluate_pull_request(platform, config, pr_ref).await;
        evaluation.record(url, verdict);
    }

    evaluation.discard_failed();
    evaluation
}
