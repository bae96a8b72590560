//! Release planning - pure functions for creating release plans
//!
//! No I/O happens here: the evaluation and the release date are passed in,
//! making the strategy and branch decisions easy to unit test.

use crate::config::Config;
use crate::release::evaluate::Evaluation;
use crate::types::{MergeStrategy, PullRequestDetail};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Marker placed in front of titles of pull requests moved onto a release branch
pub const RELEASE_TITLE_PREFIX: &str = "[PREPARED-FOR-RELEASE]";

/// Title of the pull request opened from a release branch
pub const RELEASE_PULL_REQUEST_TITLE: &str = "Release pull-request";

static RELEASE_BRANCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(release/\w+)").expect("valid release branch regex"));

/// Whether a branch follows the release branch naming scheme
pub fn is_release_branch(branch_name: &str) -> bool {
    RELEASE_BRANCH_RE.is_match(branch_name)
}

/// Pick the merge strategy for a pull request.
///
/// Release branches are merged with a merge commit so their history is
/// kept; the note explains this in the chat reply.
pub fn merge_strategy_for(
    detail: &PullRequestDetail,
    default: MergeStrategy,
) -> (MergeStrategy, Option<String>) {
    if is_release_branch(&detail.branch_name) {
        let note = format!(
            "I merge `#{}` pull-request using `merge` strategy, because it is a release pull-request.\n",
            detail.id
        );
        return (MergeStrategy::Merge, Some(note));
    }

    (default, None)
}

/// Release branch name for a given day, `release/YYYY.MM.DD`
pub fn release_branch_name(date: NaiveDate) -> String {
    format!("release/{}", date.format("%Y.%m.%d"))
}

/// Prefix a title with the release marker unless it already carries it
pub fn prepare_release_title(title: &str) -> String {
    if title.contains(RELEASE_TITLE_PREFIX) {
        return title.to_string();
    }

    format!("{RELEASE_TITLE_PREFIX} {title}")
}

/// Reviewers for the release pull request: every required reviewer except
/// the account the bot acts as
pub fn release_reviewers(config: &Config) -> Vec<String> {
    config
        .bitbucket
        .required_reviewers
        .iter()
        .filter(|reviewer| reviewer.uuid != config.bitbucket.current_user_uuid)
        .map(|reviewer| reviewer.uuid.clone())
        .collect()
}

/// What to do with one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryStep {
    /// Only one pull request: merge it into its destination branch
    Direct {
        /// Repository slug
        repository: String,
        /// The pull request
        pull_request: PullRequestDetail,
    },
    /// Several pull requests: collect them on a release branch
    ReleaseBranch {
        /// Repository slug
        repository: String,
        /// Workspace the branch is created in
        workspace: String,
        /// Release branch name
        branch: String,
        /// Pull requests to retarget and merge
        pull_requests: Vec<PullRequestDetail>,
        /// Description for the release pull request
        description: String,
    },
}

impl RepositoryStep {
    /// Repository this step applies to
    pub fn repository(&self) -> &str {
        match self {
            Self::Direct { repository, .. } | Self::ReleaseBranch { repository, .. } => {
                repository
            }
        }
    }
}

/// Release plan - the functional core output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleasePlan {
    /// Nothing is mergeable
    Nothing,
    /// Exactly one mergeable pull request overall
    Single(PullRequestDetail),
    /// Per-repository steps, in repository order
    Repositories(Vec<RepositoryStep>),
}

impl ReleasePlan {
    /// Whether the plan performs no work
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

/// Create a release plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `evaluation` - Evaluated pull requests, already filtered
/// * `date` - Day the release branch is named after
#[must_use]
pub fn create_release_plan(evaluation: &Evaluation, date: NaiveDate) -> ReleasePlan {
    if evaluation.by_repository.is_empty() {
        return ReleasePlan::Nothing;
    }

    if evaluation.mergeable.len() == 1
        && let Some(detail) = evaluation.mergeable.values().next()
    {
        return ReleasePlan::Single(detail.clone());
    }

    let branch = release_branch_name(date);
    let steps = evaluation
        .by_repository
        .iter()
        .filter_map(|(repository, group)| {
            let pull_requests: Vec<PullRequestDetail> = group.values().cloned().collect();
            match pull_requests.as_slice() {
                [] => None,
                [single] => Some(RepositoryStep::Direct {
                    repository: repository.clone(),
                    pull_request: single.clone(),
                }),
                [first, ..] => {
                    let workspace = first.workspace.clone();
                    let description = pull_requests
                        .iter()
                        .map(|pr| format!("{}\n", pr.description))
                        .collect();
                    Some(RepositoryStep::ReleaseBranch {
                        repository: repository.clone(),
                        workspace,
                        branch: branch.clone(),
                        pull_requests,
                        description,
                    })
                }
            }
        })
        .collect();

    ReleasePlan::Repositories(steps)
}
