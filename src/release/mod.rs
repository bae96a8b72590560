//! Release engine for chat-linked pull requests
//!
//! Pipeline:
//! 1. Extract - find pull request links in text (pure)
//! 2. Evaluate - look each one up and apply the readiness policy (effectful, read-only)
//! 3. Plan - decide direct merge vs. release branch per repository (pure)
//! 4. Execute - drive branch, retarget, merge and pull request calls (effectful)
//! 5. Report - format the chat reply (pure)

mod evaluate;
mod execute;
mod extract;
mod plan;
mod report;

pub use evaluate::{
    check_readiness, evaluate_pull_request, evaluate_pull_requests, pull_request_url, Evaluation,
    FailedPullRequest, PolicyFailure, ReadinessVerdict,
};
pub use execute::{execute_release_plan, ExecutionReport};
pub use extract::{extract_pull_requests, pull_request_pattern};
pub use plan::{
    create_release_plan, is_release_branch, merge_strategy_for, prepare_release_title,
    release_branch_name, release_reviewers, ReleasePlan, RepositoryStep,
    RELEASE_PULL_REQUEST_TITLE, RELEASE_TITLE_PREFIX,
};
pub use report::{
    failed_pull_requests_text, found_pull_requests_text, mergeable_pull_requests_text,
    release_notification_text, release_plan_text, NOTHING_TO_RELEASE, NO_PULL_REQUESTS,
};
