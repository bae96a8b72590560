//! Configuration loading from `config.toml`.
//!
//! The file lives in `<config dir>/bb-release/config.toml` unless a path is
//! given explicitly. Secrets may be supplied through the environment instead:
//! `BITBUCKET_USERNAME`, `BITBUCKET_APP_PASSWORD` and `SLACK_TOKEN` override
//! whatever the file says.

use crate::error::{Error, Result};
use crate::types::RequiredReviewer;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
const CONFIG_DIR: &str = "bb-release";

/// Filename for the configuration.
const CONFIG_FILE: &str = "config.toml";

/// Request timeout in seconds shared by the Bitbucket and Slack clients
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Bitbucket settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketConfig {
    /// Web host used in pull request links
    pub host: String,
    /// REST API base URL
    pub api_url: String,
    /// Branch release branches are cut from
    pub main_branch: String,
    /// Account name for basic auth
    pub username: Option<String>,
    /// App password for basic auth
    pub app_password: Option<String>,
    /// Uuid of the account the bot acts as
    pub current_user_uuid: String,
    /// Reviewers whose approval gates a release
    pub required_reviewers: Vec<RequiredReviewer>,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            host: "bitbucket.org".to_string(),
            api_url: "https://api.bitbucket.org/2.0".to_string(),
            main_branch: "main".to_string(),
            username: None,
            app_password: None,
            current_user_uuid: String::new(),
            required_reviewers: Vec::new(),
        }
    }
}

/// Slack settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Bot token (`xoxb-...`)
    pub token: Option<String>,
    /// Channel that receives release summaries
    pub release_channel: Option<String>,
    /// Whether release summaries are posted at all
    pub release_channel_message_enabled: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bitbucket settings
    pub bitbucket: BitbucketConfig,
    /// Slack settings
    pub slack: SlackConfig,
}

impl Config {
    /// Channel for release summaries, if posting is enabled
    pub fn release_channel(&self) -> Option<&str> {
        if !self.slack.release_channel_message_enabled {
            return None;
        }
        self.slack
            .release_channel
            .as_deref()
            .filter(|channel| !channel.is_empty())
    }

    /// Apply environment overrides for credentials.
    pub fn apply_env(&mut self) {
        if let Ok(username) = env::var("BITBUCKET_USERNAME") {
            self.bitbucket.username = Some(username);
        }
        if let Ok(password) = env::var("BITBUCKET_APP_PASSWORD") {
            self.bitbucket.app_password = Some(password);
        }
        if let Ok(token) = env::var("SLACK_TOKEN") {
            self.slack.token = Some(token);
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

/// Load configuration from disk and apply environment overrides.
///
/// Returns the default configuration if the file doesn't exist.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };

    let mut config = match path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?
        }
        _ => Config::default(),
    };

    config.apply_env();
    Ok(config)
}
