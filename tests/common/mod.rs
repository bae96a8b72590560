//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::*;

use bb_release::config::Config;
use bb_release::types::{ChatMessage, Participant, PrState, PullRequestDetail, RequiredReviewer};

pub const REVIEWER_UUID: &str = "{test-uid}";
pub const SECOND_REVIEWER_UUID: &str = "{test-second-uid}";
pub const BOT_UUID: &str = "{bot-uid}";

/// Config with two required reviewers and a release channel that is switched off
pub fn reviewers_config() -> Config {
    let mut config = Config::default();
    config.bitbucket.current_user_uuid = BOT_UUID.to_string();
    config.bitbucket.required_reviewers = vec![
        RequiredReviewer {
            uuid: REVIEWER_UUID.to_string(),
            slack_uid: "TESTSLACKID".to_string(),
        },
        RequiredReviewer {
            uuid: SECOND_REVIEWER_UUID.to_string(),
            slack_uid: "TESTSECONDSLACKID".to_string(),
        },
    ];
    config
}

/// Open pull request in workspace `john` without participants
pub fn make_detail(repository_slug: &str, id: u64, title: &str) -> PullRequestDetail {
    PullRequestDetail {
        workspace: "john".to_string(),
        repository_slug: repository_slug.to_string(),
        id,
        title: title.to_string(),
        description: "Feature;Some task description;\\(https://some-url.net/browse/error-502\\);JohnDoeProject".to_string(),
        branch_name: format!("feature/{id}"),
        destination_branch: "main".to_string(),
        state: PrState::Open,
        participants: vec![],
        html_url: format!("https://bitbucket.org/john/{repository_slug}/pull-requests/{id}"),
    }
}

/// Open pull request approved by the first required reviewer
pub fn make_approved(repository_slug: &str, id: u64, title: &str) -> PullRequestDetail {
    let mut detail = make_detail(repository_slug, id, title);
    detail.participants = vec![Participant {
        uuid: REVIEWER_UUID.to_string(),
        approved: true,
    }];
    detail
}

/// Link to a pull request in workspace `john`
pub fn link(repository_slug: &str, id: u64) -> String {
    format!("https://bitbucket.org/john/{repository_slug}/pull-requests/{id}")
}

/// Chat message from user `U1` in channel `C1`
pub fn message(text: &str) -> ChatMessage {
    ChatMessage {
        channel: "C1".to_string(),
        text: text.to_string(),
        user: "U1".to_string(),
    }
}
