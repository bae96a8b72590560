//! bb-release - release Bitbucket pull requests linked from chat
//!
//! A chat message containing pull request links is turned into a release:
//! every linked pull request is checked against the readiness policy, and
//! the ready ones are merged, either directly or through a dated release
//! branch when a repository has several of them.

pub mod config;
pub mod error;
pub mod event;
pub mod notify;
pub mod platform;
pub mod release;
pub mod types;

pub use event::{check_release, run_release, run_release_on, ReleaseOutcome, EVENT};
