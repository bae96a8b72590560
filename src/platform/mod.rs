//! Bitbucket platform service
//!
//! The release engine only talks to Bitbucket through [`BitbucketService`],
//! so tests can swap in a recording mock.

mod bitbucket;

pub use bitbucket::BitbucketClient;

use crate::error::Result;
use crate::types::{
    BranchHandle, CreatedPullRequest, MergeResult, MergeStrategy, NewPullRequest,
    PullRequestDetail,
};
use async_trait::async_trait;

/// Bitbucket operations used by the release engine
#[async_trait]
pub trait BitbucketService: Send + Sync {
    /// Fetch pull request details, including participants
    async fn pull_request_info(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
    ) -> Result<PullRequestDetail>;

    /// Create a branch from the main branch
    async fn create_branch(
        &self,
        workspace: &str,
        repository_slug: &str,
        branch_name: &str,
    ) -> Result<BranchHandle>;

    /// Change the title and destination branch of a pull request
    async fn change_pull_request_destination(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
        title: &str,
        branch_name: &str,
    ) -> Result<()>;

    /// Merge a pull request with the given commit message and strategy
    async fn merge_pull_request(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
        description: &str,
        strategy: MergeStrategy,
    ) -> Result<MergeResult>;

    /// Open a new pull request
    async fn create_pull_request(
        &self,
        workspace: &str,
        repository_slug: &str,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest>;
}
