//! Batched status query through the GitHub CLI, which brings its own authentication.

use super::error::Error;
use crate::{app::StatusSource, types::RemoteStatus, RepositoryId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Everything shown in a status row, in one round trip.
///
/// The default branch may point at an annotated tag, in which case the commit is one more
/// `target` away.
const STATUS_QUERY: &str = "query($owner:String!, $name:String!) {
  repository(owner:$owner, name:$name) {
    stargazerCount
    issues(states:OPEN) { totalCount }
    pullRequests(states:OPEN) { totalCount }
    releases(first:1, orderBy:{field:CREATED_AT, direction:DESC}) {
      nodes { tagName createdAt }
    }
    defaultBranchRef {
      target {
        __typename
        ... on Commit { committedDate }
        ... on Tag { target { ... on Commit { committedDate } } }
      }
    }
  }
}";

/// Runs status queries with `gh api graphql`.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
}

impl GhCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    async fn run_query(&self, repo_id: &RepositoryId) -> Result<Vec<u8>, Error> {
        let RepositoryId { owner, name } = repo_id;
        let output = Command::new(&self.program)
            .args(["api", "graphql"])
            .arg("-f")
            .arg(format!("owner={owner}"))
            .arg("-f")
            .arg(format!("name={name}"))
            .arg("-f")
            .arg(format!("query={STATUS_QUERY}"))
            .output()
            .await
            .map_err(|source| Error::Spawn { program: self.program.clone(), source })?;
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        if !output.status.success() {
            debug!(status = ?output.status, %stderr, "gh exited with failure");
            let message = if stderr.is_empty() { "gh api failed".to_owned() } else { stderr };
            return Err(Error::Client(message));
        }
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(if stderr.is_empty() { Error::EmptyOutput } else { Error::Client(stderr) });
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl StatusSource for GhCli {
    #[tracing::instrument(skip(self))]
    async fn fetch_status(&self, repo_id: &RepositoryId) -> Result<RemoteStatus, Error> {
        let body = self.run_query(repo_id).await?;
        parse_status(&body)
    }
}

#[derive(Deserialize, Debug)]
struct Response {
    data: Option<Data>,
}

#[derive(Deserialize, Debug)]
struct Data {
    repository: Option<Repository>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Repository {
    #[serde(default)]
    stargazer_count: u64,
    issues: TotalCount,
    pull_requests: TotalCount,
    #[serde(default)]
    releases: Option<Nodes<Release>>,
    default_branch_ref: Option<BranchRef>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TotalCount {
    total_count: u64,
}

#[derive(Deserialize, Debug)]
struct Nodes<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Release {
    tag_name: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
struct BranchRef {
    target: Option<GitObject>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "__typename")]
enum GitObject {
    Commit {
        #[serde(rename = "committedDate")]
        committed_date: Option<DateTime<Utc>>,
    },
    Tag {
        target: Option<TaggedCommit>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct TaggedCommit {
    #[serde(rename = "committedDate")]
    committed_date: Option<DateTime<Utc>>,
}

impl GitObject {
    fn committed_date(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Commit { committed_date } => committed_date,
            Self::Tag { target } => target.and_then(|x| x.committed_date),
            Self::Other => None,
        }
    }
}

/// Maps a `gh api graphql` response body to a status.
fn parse_status(body: &[u8]) -> Result<RemoteStatus, Error> {
    let response: Response = serde_json::from_slice(body)?;
    let repo = response.data.and_then(|x| x.repository).ok_or(Error::NotFound)?;

    let release = repo.releases.and_then(|x| x.nodes.into_iter().next());
    let (release_tag, released_at) = match release {
        Some(Release { tag_name, created_at }) => (tag_name, created_at),
        None => (None, None),
    };
    let last_activity_at =
        repo.default_branch_ref.and_then(|x| x.target).and_then(GitObject::committed_date);

    let status = RemoteStatus {
        open_issues: repo.issues.total_count,
        open_pull_requests: repo.pull_requests.total_count,
        stars: repo.stargazer_count,
        release_tag,
        released_at,
        last_activity_at,
    };
    Ok(status)
}
