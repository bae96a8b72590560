//! Bitbucket Cloud service implementation

use crate::config::{BitbucketConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{Error, Result};
use crate::platform::BitbucketService;
use crate::types::{
    BranchHandle, CreatedPullRequest, MergeResult, MergeStrategy, NewPullRequest, Participant,
    PrState, PullRequestDetail,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bitbucket Cloud service using reqwest
pub struct BitbucketClient {
    client: Client,
    api_url: String,
    main_branch: String,
    username: Option<String>,
    app_password: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ApiBranch {
    name: String,
}

#[derive(Deserialize, Default)]
struct ApiRepository {
    #[serde(default)]
    full_name: String,
}

#[derive(Deserialize)]
struct ApiEndpoint {
    branch: ApiBranch,
    #[serde(default)]
    repository: ApiRepository,
}

#[derive(Deserialize)]
struct ApiUser {
    #[serde(default)]
    uuid: String,
}

#[derive(Deserialize)]
struct ApiParticipant {
    user: ApiUser,
    #[serde(default)]
    approved: bool,
}

#[derive(Deserialize, Default)]
struct ApiHref {
    #[serde(default)]
    href: String,
}

#[derive(Deserialize, Default)]
struct ApiLinks {
    #[serde(default)]
    html: ApiHref,
}

/// Pull request as returned by the `pullrequests` endpoints
#[derive(Deserialize)]
struct ApiPullRequest {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    state: String,
    source: ApiEndpoint,
    destination: ApiEndpoint,
    #[serde(default)]
    participants: Vec<ApiParticipant>,
    #[serde(default)]
    links: ApiLinks,
}

#[derive(Serialize)]
struct BranchName<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct CommitTarget<'a> {
    hash: &'a str,
}

#[derive(Serialize)]
struct CreateBranchPayload<'a> {
    name: &'a str,
    target: CommitTarget<'a>,
}

#[derive(Serialize)]
struct BranchRef<'a> {
    branch: BranchName<'a>,
}

#[derive(Serialize)]
struct UpdateDestinationPayload<'a> {
    title: &'a str,
    destination: BranchRef<'a>,
}

#[derive(Serialize)]
struct MergePayload<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    message: &'a str,
    close_source_branch: bool,
    merge_strategy: &'static str,
}

#[derive(Serialize)]
struct ReviewerPayload<'a> {
    uuid: &'a str,
}

#[derive(Serialize)]
struct CreatePullRequestPayload<'a> {
    title: &'a str,
    description: &'a str,
    source: BranchRef<'a>,
    reviewers: Vec<ReviewerPayload<'a>>,
}

impl ApiPullRequest {
    /// Convert into our detail type.
    ///
    /// Workspace and slug come from the destination repository when Bitbucket
    /// reports one, since links may use a stale or differently cased slug.
    fn into_detail(self, workspace: &str, repository_slug: &str) -> PullRequestDetail {
        let (workspace, repository_slug) = self
            .destination
            .repository
            .full_name
            .split_once('/')
            .map_or_else(
                || (workspace.to_string(), repository_slug.to_string()),
                |(ws, slug)| (ws.to_string(), slug.to_string()),
            );

        PullRequestDetail {
            workspace,
            repository_slug,
            id: self.id,
            title: self.title,
            description: self.description,
            branch_name: self.source.branch.name,
            destination_branch: self.destination.branch.name,
            state: PrState::from(self.state),
            participants: self
                .participants
                .into_iter()
                .map(|p| Participant {
                    uuid: p.user.uuid,
                    approved: p.approved,
                })
                .collect(),
            html_url: self.links.html.href,
        }
    }
}

impl BitbucketClient {
    /// Create a new Bitbucket client from configuration
    pub fn new(config: &BitbucketConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("bb-release")
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Bitbucket(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            main_branch: config.main_branch.clone(),
            username: config.username.clone(),
            app_password: config.app_password.clone(),
        })
    }

    fn repository_url(&self, workspace: &str, repository_slug: &str, path: &str) -> String {
        format!(
            "{}/repositories/{}/{}{}",
            self.api_url,
            urlencoding::encode(workspace),
            urlencoding::encode(repository_slug),
            path
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.app_password.as_deref()),
            None => request,
        }
    }

    /// Turn a non-success response into `Error::Bitbucket` with the API message.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("Bitbucket API returned {status}"));
        Err(Error::Bitbucket(message))
    }
}

#[async_trait]
impl BitbucketService for BitbucketClient {
    async fn pull_request_info(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
    ) -> Result<PullRequestDetail> {
        debug!(workspace, repository_slug, id, "getting pull request info");
        let url = self.repository_url(workspace, repository_slug, &format!("/pullrequests/{id}"));

        let response = self.authorize(self.client.get(&url)).send().await?;
        let pr: ApiPullRequest = Self::check(response).await?.json().await?;

        let detail = pr.into_detail(workspace, repository_slug);
        debug!(id, state = %detail.state, "got pull request info");
        Ok(detail)
    }

    async fn create_branch(
        &self,
        workspace: &str,
        repository_slug: &str,
        branch_name: &str,
    ) -> Result<BranchHandle> {
        debug!(repository_slug, branch_name, "creating branch");
        let url = self.repository_url(workspace, repository_slug, "/refs/branches");

        let payload = CreateBranchPayload {
            name: branch_name,
            target: CommitTarget {
                hash: &self.main_branch,
            },
        };

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        let branch: ApiBranch = Self::check(response).await?.json().await?;

        debug!(branch = %branch.name, "created branch");
        Ok(BranchHandle { name: branch.name })
    }

    async fn change_pull_request_destination(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
        title: &str,
        branch_name: &str,
    ) -> Result<()> {
        debug!(repository_slug, id, branch_name, "changing pull request destination");
        let url = self.repository_url(workspace, repository_slug, &format!("/pullrequests/{id}"));

        let payload = UpdateDestinationPayload {
            title,
            destination: BranchRef {
                branch: BranchName { name: branch_name },
            },
        };

        let response = self
            .authorize(self.client.put(&url))
            .json(&payload)
            .send()
            .await?;
        Self::check(response).await?;

        debug!(id, "changed pull request destination");
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        workspace: &str,
        repository_slug: &str,
        id: u64,
        description: &str,
        strategy: MergeStrategy,
    ) -> Result<MergeResult> {
        debug!(repository_slug, id, %strategy, "merging pull request");
        let url = self.repository_url(
            workspace,
            repository_slug,
            &format!("/pullrequests/{id}/merge"),
        );

        let payload = MergePayload {
            kind: "pullrequest",
            message: description,
            close_source_branch: true,
            merge_strategy: strategy.as_wire(),
        };

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        let pr: ApiPullRequest = Self::check(response).await?.json().await?;

        let result = MergeResult {
            state: PrState::from(pr.state),
        };
        debug!(id, state = %result.state, "merge complete");
        Ok(result)
    }

    async fn create_pull_request(
        &self,
        workspace: &str,
        repository_slug: &str,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest> {
        debug!(
            repository_slug,
            source = %pull_request.source_branch,
            "creating pull request"
        );
        let url = self.repository_url(workspace, repository_slug, "/pullrequests");

        let payload = CreatePullRequestPayload {
            title: &pull_request.title,
            description: &pull_request.description,
            source: BranchRef {
                branch: BranchName {
                    name: &pull_request.source_branch,
                },
            },
            reviewers: pull_request
                .reviewers
                .iter()
                .map(|uuid| ReviewerPayload { uuid })
                .collect(),
        };

        let response = self
            .authorize(self.client.post(&url))
            .json(&payload)
            .send()
            .await?;
        let pr: ApiPullRequest = Self::check(response).await?.json().await?;

        debug!(id = pr.id, "created pull request");
        Ok(CreatedPullRequest {
            id: pr.id,
            link: pr.links.html.href,
        })
    }
}
