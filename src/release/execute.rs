//! Release execution - effectful operations
//!
//! Takes a `ReleasePlan` (created by the pure planning functions) and drives
//! the Bitbucket calls, building the chat narrative as it goes. Text is kept
//! even when a step aborts the run so the reply can show partial progress.

use crate::config::Config;
use crate::error::Error;
use crate::platform::BitbucketService;
use crate::release::plan::{
    merge_strategy_for, prepare_release_title, release_reviewers, ReleasePlan, RepositoryStep,
    RELEASE_PULL_REQUEST_TITLE,
};
use crate::types::{MergeStrategy, NewPullRequest, PullRequestDetail};
use tracing::{debug, info, warn};

/// Result of release execution
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// Narrative of what happened
    pub text: String,
    /// Ids of pull requests that were merged
    pub merged: Vec<u64>,
    /// Links of release pull requests that were opened
    pub release_pull_requests: Vec<String>,
    /// Error that stopped the run, if any
    pub error: Option<Error>,
}

impl ExecutionReport {
    /// Check if the run completed without aborting
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of merging a set of pull requests of one repository
#[derive(Debug, Default)]
struct MergeBatch {
    text: String,
    merged: Vec<u64>,
    error: Option<Error>,
}

/// Merge pull requests one after another.
///
/// A failure is reported inline and the remaining pull requests are still
/// attempted; the first error is kept for the caller.
async fn merge_pull_requests(
    platform: &dyn BitbucketService,
    repository: &str,
    pull_requests: &[PullRequestDetail],
    default: MergeStrategy,
) -> MergeBatch {
    let mut batch = MergeBatch::default();

    for pr in pull_requests {
        let (strategy, note) = merge_strategy_for(pr, default);
        if let Some(note) = note {
            batch.text.push_str(&note);
        }

        match platform
            .merge_pull_request(
                &pr.workspace,
                &pr.repository_slug,
                pr.id,
                &pr.description,
                strategy,
            )
            .await
        {
            Ok(result) => {
                info!(
                    pull_request_id = pr.id,
                    repository,
                    %strategy,
                    state = %result.state,
                    "Merged pull-request"
                );
                batch.merged.push(pr.id);
            }
            Err(e) => {
                warn!(pull_request_id = pr.id, repository, error = %e, "Failed to merge pull-request");
                if !batch.text.is_empty() && !batch.text.ends_with('\n') {
                    batch.text.push('\n');
                }
                batch.text.push_str(&format!(
                    "I cannot merge the pull-request #{} because of error `{e}`",
                    pr.id
                ));
                batch.error.get_or_insert(e);
            }
        }
    }

    if batch.error.is_none() {
        if let [pr] = pull_requests {
            batch.text.push_str(&format!(
                "\nI merged pull-request #`{}` into destination branch of repository `{repository}` :)",
                pr.id
            ));
        } else {
            batch.text.push_str(&format!(
                "\nI merged all pull-requests for repository `{repository}` into destination branch :)"
            ));
        }
    } else if !batch.merged.is_empty() {
        batch.text.push_str(&format!(
            "\nI merged {} of {} pull-requests for repository `{repository}`.",
            batch.merged.len(),
            pull_requests.len()
        ));
    }

    batch
}

/// Collect several pull requests of one repository on a release branch.
///
/// Returns `Err` with the abort error when the branch or the release pull
/// request cannot be created; the report text is updated either way.
async fn release_repository(
    report: &mut ExecutionReport,
    platform: &dyn BitbucketService,
    config: &Config,
    step: &RepositoryStep,
) -> Result<(), Error> {
    let RepositoryStep::ReleaseBranch {
        repository,
        workspace,
        branch,
        pull_requests,
        description,
    } = step
    else {
        return Ok(());
    };

    let mut release_branch = None;
    let mut retargeted = Vec::new();

    for pr in pull_requests {
        if release_branch.is_none() {
            match platform
                .create_branch(&pr.workspace, &pr.repository_slug, branch)
                .await
            {
                Ok(handle) => {
                    debug!(repository = %repository, branch = %handle.name, "created release branch");
                    release_branch = Some(handle);
                }
                Err(e) => {
                    warn!(repository = %repository, branch = %branch, error = %e, "Received an error during the release branch creation");
                    return Err(Error::ReleaseBranch {
                        repository: repository.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        if let Err(e) = platform
            .change_pull_request_destination(
                &pr.workspace,
                &pr.repository_slug,
                pr.id,
                &prepare_release_title(&pr.title),
                branch,
            )
            .await
        {
            warn!(pull_request_id = pr.id, repository = %repository, error = %e, "Received an error during the branch destination switch");
            report.text.push_str(&format!(
                "I've tried to switch the destination for pull-request #{} and I failed. Reason: `{e}`\n",
                pr.id
            ));
            continue;
        }

        retargeted.push(pr.clone());
    }

    let Some(release_branch) = release_branch else {
        return Ok(());
    };

    if retargeted.is_empty() {
        report.text.push_str(&format!(
            "\nNothing was merged into `{branch}` of `{repository}`, so I skip the release pull-request."
        ));
        return Ok(());
    }

    report.text.push_str(&format!(
        "\nTrying to merge the {} pull-requests to the `{branch}` branch  of `{repository}` repository",
        retargeted.len()
    ));
    let batch = merge_pull_requests(platform, repository, &retargeted, MergeStrategy::Squash).await;
    report.text.push('\n');
    report.text.push_str(&batch.text);
    report.merged.extend(&batch.merged);

    if batch.merged.is_empty() {
        report.text.push_str(&format!(
            "\nNothing was merged into `{branch}` of `{repository}`, so I skip the release pull-request."
        ));
        return Ok(());
    }

    let release_pull_request = NewPullRequest {
        title: RELEASE_PULL_REQUEST_TITLE.to_string(),
        description: description.clone(),
        source_branch: release_branch.name,
        reviewers: release_reviewers(config),
    };

    let link = platform
        .create_pull_request(workspace, repository, &release_pull_request)
        .await
        .and_then(|created| {
            if created.link.is_empty() {
                warn!(repository = %repository, id = created.id, "There is no pull-request link in response.");
                Err(Error::Bitbucket(
                    "The pull-request link was not found in the response. ".to_string(),
                ))
            } else {
                Ok(created.link)
            }
        })
        .map_err(|e| Error::ReleasePullRequest {
            repository: repository.clone(),
            source: Box::new(e),
        })?;

    info!(repository = %repository, link = %link, "created release pull-request");
    report
        .text
        .push_str(&format!("\nPlease approve release pull-request: {link}"));
    report.release_pull_requests.push(link);
    Ok(())
}

/// Execute the release plan (EFFECTFUL)
///
/// # Arguments
/// * `plan` - The release plan to execute
/// * `platform` - Bitbucket service for API calls
/// * `config` - Required reviewers and acting user
///
/// # Returns
/// An `ExecutionReport`; `error` is set when the run had to stop
pub async fn execute_release_plan(
    plan: &ReleasePlan,
    platform: &dyn BitbucketService,
    config: &Config,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();
    info!("Merge of received pull-requests started");

    match plan {
        ReleasePlan::Nothing => {}
        ReleasePlan::Single(pr) => {
            debug!("There is only 1 received pull-request. Trying to merge it.");
            report.text.push_str(
                "We have only one pull-request, so I will try to merge it directly to the main branch.\n",
            );
            let batch = merge_pull_requests(
                platform,
                &pr.repository_slug,
                std::slice::from_ref(pr),
                MergeStrategy::Squash,
            )
            .await;
            report.text.push_str(&batch.text);
            report.text.push('\n');
            report.merged = batch.merged;
            report.error = batch.error;
        }
        ReleasePlan::Repositories(steps) => {
            for step in steps {
                match step {
                    RepositoryStep::Direct {
                        repository,
                        pull_request,
                    } => {
                        debug!(repository = %repository, "Only one pull-request received for selected repository");
                        if !report.text.is_empty() && !report.text.ends_with('\n') {
                            report.text.push('\n');
                        }
                        report.text.push_str(&format!(
                            "There is only one pull-request for selected repository `{repository}`."
                        ));
                        let batch = merge_pull_requests(
                            platform,
                            repository,
                            std::slice::from_ref(pull_request),
                            MergeStrategy::Squash,
                        )
                        .await;
                        report.text.push_str(&batch.text);
                        report.text.push('\n');
                        report.merged.extend(&batch.merged);
                    }
                    RepositoryStep::ReleaseBranch { .. } => {
                        if let Err(e) = release_repository(&mut report, platform, config, step).await
                        {
                            report.text.push_str(&format!("\n{e}"));
                            report.error = Some(e);
                            break;
                        }
                    }
                }
            }
        }
    }

    info!(
        merged = report.merged.len(),
        success = report.is_success(),
        "Merge of received pull-requests finished"
    );
    report
}
