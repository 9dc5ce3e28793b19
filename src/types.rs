//! Defines application domain data types.

use crate::{display::format_relative, repository_id::RepositoryId};
use chrono::{DateTime, NaiveDate, Utc};

// types ------------------------------

/// Status of a repository as reported by GitHub.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct RemoteStatus {
    pub open_issues: u64,
    pub open_pull_requests: u64,
    pub stars: u64,
    pub release_tag: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    /// Latest push or default branch commit, depending on the source.
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// One row of the summary table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct StatusRecord {
    /// Local directory name.
    pub display_name: String,
    pub repo_id: RepositoryId,
    pub open_issues: u64,
    pub open_pull_requests: u64,
    pub stars: u64,
    pub release_tag: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Relative time such as `3 days ago`, or `-`.
    pub last_activity: String,
}

// end: types ------------------------------

// StatusRecord impls ------------------------------

impl StatusRecord {
    pub fn new(
        display_name: impl Into<String>,
        repo_id: RepositoryId,
        status: RemoteStatus,
        now: &DateTime<Utc>,
    ) -> Self {
        let RemoteStatus {
            open_issues,
            open_pull_requests,
            stars,
            release_tag,
            released_at,
            last_activity_at,
        } = status;
        Self {
            display_name: display_name.into(),
            repo_id,
            open_issues,
            open_pull_requests,
            stars,
            release_tag: release_tag.filter(|x| !x.is_empty()),
            release_date: released_at.map(|x| x.date_naive()),
            last_activity: format_relative(last_activity_at.as_ref(), now),
        }
    }
}

// end: StatusRecord impls ------------------------------
