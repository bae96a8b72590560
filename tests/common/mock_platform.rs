//! Mock Bitbucket service and notifier for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use bb_release::error::{Error, Result};
use bb_release::notify::Notifier;
use bb_release::platform::BitbucketService;
use bb_release::types::{
    BranchHandle, CreatedPullRequest, MergeResult, MergeStrategy, NewPullRequest, PrState,
    PullRequestDetail,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_branch`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBranchCall {
    pub workspace: String,
    pub repository_slug: String,
    pub branch_name: String,
}

/// Call record for `change_pull_request_destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDestinationCall {
    pub repository_slug: String,
    pub id: u64,
    pub title: String,
    pub branch_name: String,
}

/// Call record for `merge_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub repository_slug: String,
    pub id: u64,
    pub description: String,
    pub strategy: MergeStrategy,
}

/// Call record for `create_pull_request`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePullRequestCall {
    pub workspace: String,
    pub repository_slug: String,
    pub pull_request: NewPullRequest,
}

/// Simple mock Bitbucket service for testing
///
/// Features:
/// - Configurable pull request info per (repository, id)
/// - Auto-incrementing release pull request ids
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockBitbucketService {
    next_pr_id: AtomicU64,
    info_responses: Mutex<HashMap<(String, u64), PullRequestDetail>>,
    // Call tracking
    info_calls: Mutex<Vec<(String, u64)>>,
    create_branch_calls: Mutex<Vec<CreateBranchCall>>,
    change_destination_calls: Mutex<Vec<ChangeDestinationCall>>,
    merge_calls: Mutex<Vec<MergeCall>>,
    create_pr_calls: Mutex<Vec<CreatePullRequestCall>>,
    // Error injection
    error_on_info: Mutex<HashMap<u64, String>>,
    error_on_create_branch: Mutex<Option<String>>,
    error_on_change_destination: Mutex<HashMap<u64, String>>,
    error_on_merge: Mutex<Option<String>>,
    error_on_merge_ids: Mutex<HashSet<u64>>,
    error_on_create_pr: Mutex<Option<String>>,
    empty_pr_link: Mutex<bool>,
}

impl Default for MockBitbucketService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBitbucketService {
    /// Create a mock with no pull requests
    pub fn new() -> Self {
        Self {
            next_pr_id: AtomicU64::new(100),
            info_responses: Mutex::new(HashMap::new()),
            info_calls: Mutex::new(Vec::new()),
            create_branch_calls: Mutex::new(Vec::new()),
            change_destination_calls: Mutex::new(Vec::new()),
            merge_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            error_on_info: Mutex::new(HashMap::new()),
            error_on_create_branch: Mutex::new(None),
            error_on_change_destination: Mutex::new(HashMap::new()),
            error_on_merge: Mutex::new(None),
            error_on_merge_ids: Mutex::new(HashSet::new()),
            error_on_create_pr: Mutex::new(None),
            empty_pr_link: Mutex::new(false),
        }
    }

    /// Register the info response for a pull request, keyed by the slug used to look it up
    pub fn set_pull_request(&self, lookup_slug: &str, detail: PullRequestDetail) {
        self.info_responses
            .lock()
            .unwrap()
            .insert((lookup_slug.to_string(), detail.id), detail);
    }

    // === Error injection methods ===

    /// Make `pull_request_info` fail for a pull request id
    pub fn fail_info(&self, id: u64, msg: &str) {
        self.error_on_info
            .lock()
            .unwrap()
            .insert(id, msg.to_string());
    }

    /// Make `create_branch` return an error
    pub fn fail_create_branch(&self, msg: &str) {
        *self.error_on_create_branch.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `change_pull_request_destination` fail for a pull request id
    pub fn fail_change_destination(&self, id: u64, msg: &str) {
        self.error_on_change_destination
            .lock()
            .unwrap()
            .insert(id, msg.to_string());
    }

    /// Make every `merge_pull_request` return an error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `merge_pull_request` fail for one pull request id
    pub fn fail_merge_for(&self, id: u64) {
        self.error_on_merge_ids.lock().unwrap().insert(id);
    }

    /// Make `create_pull_request` return an error
    pub fn fail_create_pr(&self, msg: &str) {
        *self.error_on_create_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_pull_request` answer without a link
    pub fn return_empty_pr_link(&self) {
        *self.empty_pr_link.lock().unwrap() = true;
    }

    // === Call inspection ===

    pub fn get_info_calls(&self) -> Vec<(String, u64)> {
        self.info_calls.lock().unwrap().clone()
    }

    pub fn get_create_branch_calls(&self) -> Vec<CreateBranchCall> {
        self.create_branch_calls.lock().unwrap().clone()
    }

    pub fn get_change_destination_calls(&self) -> Vec<ChangeDestinationCall> {
        self.change_destination_calls.lock().unwrap().clone()
    }

    pub fn get_merge_calls(&self) -> Vec<MergeCall> {
        self.merge_calls.lock().unwrap().clone()
    }

    pub fn get_create_pr_calls(&self) -> Vec<CreatePullRequestCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Assert that nothing on Bitbucket was changed
    pub fn assert_no_mutations(&self) {
        assert!(self.get_create_branch_calls().is_empty(), "unexpected create_branch");
        assert!(
            self.get_change_destination_calls().is_empty(),
            "unexpected change_pull_request_destination"
        );
        assert!(self.get_merge_calls().is_empty(), "unexpected merge_pull_request");
        assert!(self.get_create_pr_calls().is_empty(), "unexpected create_pull_request");
    }

    /// Assert the ids merged, in order
    pub fn assert_merged(&self, expected: &[u64]) {
        let ids: Vec<u64> = self.get_merge_calls().iter().map(|c| c.id).collect();
        assert_eq!(ids, expected, "merge_pull_request ids");
    }
}

#[async_trait]
impl BitbucketService for MockBitbucketService {
    async fn pull_request_info(
        &self,
        _workspace: &str,
        repository_slug: &str,
        id: u64,
    ) -> Result<PullRequestDetail> {
        self.info_calls
            .lock()
            .unwrap()
            .push((repository_slug.to_string(), id));

        if let Some(msg) = self.error_on_info.lock().unwrap().get(&id) {
            return Err(Error::Bitbucket(msg.clone()));
        }

        self.info_responses
            .lock()
            .unwrap()
            .get(&(repository_slug.to_string(), id))
            .cloned()
            .ok_or_else(|| Error::Bitbucket(format!("Pull request {id} not found")))
    }

    async fn create_branch(
        &self,
        workspace: &str,
        repository_slug: &str,
        branch_name: &str,
    ) -> Result<BranchHandle> {
        self.create_branch_calls
            .lock()
            .unwrap()
            .push(CreateBranchCall {
                workspace: workspace.to_string(),
                repository_slug: repository_slug.to_string(),
                branch_name: branch_name.to_string(),
            });

        if let Some(msg) = self.error_on_create_branch.lock().unwrap().as_ref() {
            return Err(Error::Bitbucket(msg.clone()));
        }

        Ok(BranchHandle {
            name: branch_name.to_string(),
        })
    }

    async fn change_pull_request_destination(
        &self,
        _workspace: &str,
        repository_slug: &str,
        id: u64,
        title: &str,
        branch_name: &str,
    ) -> Result<()> {
        self.change_destination_calls
            .lock()
            .unwrap()
            .push(ChangeDestinationCall {
                repository_slug: repository_slug.to_string(),
                id,
                title: title.to_string(),
                branch_name: branch_name.to_string(),
            });

        if let Some(msg) = self.error_on_change_destination.lock().unwrap().get(&id) {
            return Err(Error::Bitbucket(msg.clone()));
        }
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        _workspace: &str,
        repository_slug: &str,
        id: u64,
        description: &str,
        strategy: MergeStrategy,
    ) -> Result<MergeResult> {
        self.merge_calls.lock().unwrap().push(MergeCall {
            repository_slug: repository_slug.to_string(),
            id,
            description: description.to_string(),
            strategy,
        });

        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Bitbucket(msg.clone()));
        }
        if self.error_on_merge_ids.lock().unwrap().contains(&id) {
            return Err(Error::Bitbucket(format!("Merge of #{id} rejected")));
        }

        Ok(MergeResult {
            state: PrState::Merged,
        })
    }

    async fn create_pull_request(
        &self,
        workspace: &str,
        repository_slug: &str,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest> {
        self.create_pr_calls
            .lock()
            .unwrap()
            .push(CreatePullRequestCall {
                workspace: workspace.to_string(),
                repository_slug: repository_slug.to_string(),
                pull_request: pull_request.clone(),
            });

        if let Some(msg) = self.error_on_create_pr.lock().unwrap().as_ref() {
            return Err(Error::Bitbucket(msg.clone()));
        }

        let id = self.next_pr_id.fetch_add(1, Ordering::SeqCst);
        let link = if *self.empty_pr_link.lock().unwrap() {
            String::new()
        } else {
            format!("https://bitbucket.org/{workspace}/{repository_slug}/pull-requests/{id}")
        };
        Ok(CreatedPullRequest { id, link })
    }
}

/// Notifier that records what it was asked to send
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, as (channel, text)
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
    }
}
