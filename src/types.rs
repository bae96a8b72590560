//! Core types for bb-release

use serde::{Deserialize, Serialize};

/// A pull request reference extracted from chat text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Bitbucket workspace
    pub workspace: String,
    /// Repository slug as written in the link
    pub repository_slug: String,
    /// Pull request id
    pub id: u64,
}

/// Pull request state as reported by Bitbucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrState {
    /// Open and reviewable
    Open,
    /// Already merged
    Merged,
    /// Declined by a reviewer or the author
    Declined,
    /// Superseded by another pull request
    Superseded,
    /// Any state this crate does not know about
    Other(String),
}

impl From<&str> for PrState {
    fn from(value: &str) -> Self {
        match value {
            "OPEN" => Self::Open,
            "MERGED" => Self::Merged,
            "DECLINED" => Self::Declined,
            "SUPERSEDED" => Self::Superseded,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for PrState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<PrState> for String {
    fn from(state: PrState) -> Self {
        state.to_string()
    }
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "OPEN"),
            Self::Merged => write!(f, "MERGED"),
            Self::Declined => write!(f, "DECLINED"),
            Self::Superseded => write!(f, "SUPERSEDED"),
            Self::Other(state) => write!(f, "{state}"),
        }
    }
}

/// A pull request participant (reviewer or commenter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Bitbucket user uuid, braces included
    pub uuid: String,
    /// Whether this participant approved the pull request
    pub approved: bool,
}

/// Pull request details hydrated by a Bitbucket lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestDetail {
    /// Bitbucket workspace
    pub workspace: String,
    /// Repository slug as canonicalized by Bitbucket
    pub repository_slug: String,
    /// Pull request id
    pub id: u64,
    /// Title
    pub title: String,
    /// Description (markdown)
    pub description: String,
    /// Source branch name
    pub branch_name: String,
    /// Destination branch name
    pub destination_branch: String,
    /// Current state
    pub state: PrState,
    /// Participants with their approval flag
    pub participants: Vec<Participant>,
    /// Web URL of the pull request
    pub html_url: String,
}

/// Merge strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MergeStrategy {
    /// Squash all commits into one
    #[default]
    Squash,
    /// Create a merge commit
    Merge,
}

impl MergeStrategy {
    /// Name used by the Bitbucket merge endpoint
    pub const fn as_wire(self) -> &'static str {
        match self {
            Self::Squash => "squash",
            Self::Merge => "merge_commit",
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// A branch created on Bitbucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchHandle {
    /// Branch name
    pub name: String,
}

/// Result of a merge operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// State after the merge, normally `MERGED`
    pub state: PrState,
}

/// Payload for creating the release pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Source branch
    pub source_branch: String,
    /// Reviewer uuids
    pub reviewers: Vec<String>,
}

/// A pull request created on Bitbucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPullRequest {
    /// Pull request id
    pub id: u64,
    /// Web link, empty when Bitbucket did not return one
    pub link: String,
}

/// A reviewer whose approval gates a release
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequiredReviewer {
    /// Bitbucket user uuid
    pub uuid: String,
    /// Slack user id used for mentions
    pub slack_uid: String,
}

impl RequiredReviewer {
    /// Slack mention markup for this reviewer
    pub fn mention(&self) -> String {
        format!("<@{}>", self.slack_uid)
    }
}

/// A decoded chat message handed over by the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    /// Channel the message was posted in
    pub channel: String,
    /// Original text
    pub text: String,
    /// Chat user id of the author
    pub user: String,
}
