//! Command line host for the release event

mod describe;
mod release;
pub mod style;

pub use describe::run_describe;
pub use release::{ReleaseOptions, run_release_command};
