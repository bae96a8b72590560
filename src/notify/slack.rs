//! Slack `chat.postMessage` notifier

use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::notify::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const SLACK_API_URL: &str = "https://slack.com/api";

/// Posts messages through the Slack Web API
pub struct SlackNotifier {
    client: Client,
    token: String,
    api_url: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    as_user: bool,
}

/// Slack answers 200 even for failures and reports them in the body
#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    /// Create a notifier for the public Slack API
    pub fn new(token: String) -> Result<Self> {
        Self::with_api_url(token, SLACK_API_URL.to_string())
    }

    /// Create a notifier against a custom API base URL
    pub fn with_api_url(token: String, api_url: String) -> Result<Self> {
        Self::with_timeout(token, api_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a notifier whose requests give up after `timeout`
    pub fn with_timeout(token: String, api_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("bb-release")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Slack(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Post a message, surfacing transport and API errors
    pub async fn send_message(&self, channel: &str, text: &str) -> Result<()> {
        let url = format!("{}/chat.postMessage", self.api_url);
        let payload = PostMessage {
            channel,
            text,
            as_user: false,
        };

        let response: PostMessageResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.ok {
            return Err(Error::Slack(
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, channel: &str, text: &str) {
        match self.send_message(channel, text).await {
            Ok(()) => debug!(channel, "sent message to the channel"),
            Err(e) => warn!(channel, text, error = %e, "Failed to send a message to the channel"),
        }
    }
}
