//! Pull request link extraction
//!
//! Pure text scanning, no remote calls.

use crate::types::PullRequestRef;
use regex::Regex;
use tracing::{debug, warn};

/// Build the link pattern for a Bitbucket web host.
///
/// The workspace is matched lazily so that a link like
/// `https://<host>/john/test-repo/pull-requests/1/commits` resolves to
/// workspace `john` and slug `test-repo`.
pub fn pull_request_pattern(host: &str) -> String {
    format!(
        r"(?m)https://{}/(?P<workspace>\S+?)/(?P<repository_slug>[^/\s]+)/pull-requests/(?P<pull_request_id>\w+)",
        regex::escape(host)
    )
}

/// Find every pull request link in `text`, in order of appearance.
///
/// Never fails: an unusable pattern or an id that isn't a 64-bit number is
/// logged and yields an empty result rather than a partial one.
pub fn extract_pull_requests(host: &str, text: &str) -> Vec<PullRequestRef> {
    let pattern = pull_request_pattern(host);
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!(pattern = %pattern, error = %e, "Error during the Find Matches operation");
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    for captures in re.captures_iter(text) {
        let raw_id = &captures["pull_request_id"];
        let Ok(id) = raw_id.parse::<u64>() else {
            warn!(pull_request_id = raw_id, "Error during pull-request ID parsing");
            return Vec::new();
        };

        found.push(PullRequestRef {
            workspace: captures["workspace"].to_string(),
            repository_slug: captures["repository_slug"].to_string(),
            id,
        });
    }

    debug!(count = found.len(), "extracted pull requests");
    found
}
