//! Error types for bb-release

use thiserror::Error;

/// Errors produced while releasing pull requests
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Bitbucket rejected a request.
    ///
    /// Displayed verbatim because the message ends up in the chat reply.
    #[error("{0}")]
    Bitbucket(String),

    /// Slack rejected a message
    #[error("slack error: {0}")]
    Slack(String),

    /// The release branch of a repository could not be created
    #[error("The release-branch for repository {repository} cannot be created, because of `{source}`")]
    ReleaseBranch {
        /// Repository slug
        repository: String,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// The follow-up release pull request could not be created
    #[error("I tried to create the release pull-request and I failed. Reason: {source}")]
    ReleasePullRequest {
        /// Repository slug
        repository: String,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
