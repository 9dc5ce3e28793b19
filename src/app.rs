use crate::{
    display::render_table,
    github,
    repository_id::RepositoryId,
    types::{RemoteStatus, StatusRecord},
    workspace::{locate_repositories, read_origin_url},
};
use anyhow::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use console::style;
use std::{
    env, fs,
    io::Write,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Source of repository status, one implementation per way of talking to GitHub.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, repo_id: &RepositoryId) -> Result<RemoteStatus, github::Error>;
}

#[derive(Error, Debug)]
#[error("Root directory not found: {}", .0.display())]
pub struct RootNotFound(pub PathBuf);

/// Resolves `root` to an absolute path of an existing directory.
///
/// The error carries the absolute path that was checked.
pub fn resolve_root(root: &Path) -> Result<PathBuf, RootNotFound> {
    let resolved = fs::canonicalize(root).unwrap_or_else(|_| absolute(root));
    if resolved.is_dir() {
        Ok(resolved)
    } else {
        Err(RootNotFound(resolved))
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir().map(|x| x.join(path)).unwrap_or_else(|_| path.to_path_buf())
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct AppConfig<'a> {
    pub root: &'a Path,
    pub recursive: bool,
    pub color: bool,
}

#[derive(Debug)]
pub struct App<'a, Source> {
    config: AppConfig<'a>,
    source: Source,
}

impl<'a, Source> App<'a, Source>
where
    Source: StatusSource,
{
    pub fn new(config: AppConfig<'a>, source: Source) -> Self {
        Self { config, source }
    }

    /// Prints the status table of every GitHub repository under the root.
    ///
    /// Repositories are processed one at a time in path order. One that fails to fetch is
    /// reported on stderr and left out of the table.
    pub async fn print_status_table(
        &self,
        out: &mut impl Write,
        now: &DateTime<Utc>,
    ) -> Result<(), Error> {
        let root = self.config.root;

        let mut paths: Vec<_> = locate_repositories(root, self.config.recursive).collect();
        if paths.is_empty() {
            writeln!(out, "No git repositories found under {}", root.display())?;
            return Ok(());
        }
        paths.sort();
        info!(count = paths.len(), "located repositories");

        let mut records = Vec::new();
        for path in &paths {
            let repo_id = match identify(path).await {
                Some(x) => x,
                None => continue,
            };
            match self.source.fetch_status(&repo_id).await {
                Ok(status) => {
                    records.push(StatusRecord::new(display_name(path), repo_id, status, now));
                }
                Err(err) => {
                    warn!(%repo_id, ?path, %err, "skipping repository");
                    eprintln!("  {} {repo_id}: {err}", style("Error:").red().for_stderr());
                }
            }
        }

        if records.is_empty() {
            writeln!(out, "No repository status to show.")?;
            return Ok(());
        }

        write!(out, "{}", render_table(&records, self.config.color))?;
        Ok(())
    }
}

/// Reads the GitHub identity of a local repository, `None` for any other remote.
async fn identify(path: &Path) -> Option<RepositoryId> {
    let url = read_origin_url(path).await?;
    let repo_id = RepositoryId::from_remote_url(&url);
    debug!(?path, %url, ?repo_id, "identified repository");
    repo_id
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use reqwest::StatusCode;
    use std::{collections::HashMap, process::Command, sync::Mutex};
    use tempfile::TempDir;

    /// Serves canned statuses and records what was asked for.
    #[derive(Default)]
    struct CannedSource {
        statuses: HashMap<RepositoryId, RemoteStatus>,
        requested: Mutex<Vec<RepositoryId>>,
    }

    #[async_trait]
    impl StatusSource for CannedSource {
        async fn fetch_status(
            &self,
            repo_id: &RepositoryId,
        ) -> Result<RemoteStatus, github::Error> {
            self.requested.lock().unwrap().push(repo_id.clone());
            self.statuses
                .get(repo_id)
                .cloned()
                .ok_or_else(|| github::Error::from_status(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }

    #[async_trait]
    impl StatusSource for &CannedSource {
        async fn fetch_status(
            &self,
            repo_id: &RepositoryId,
        ) -> Result<RemoteStatus, github::Error> {
            (**self).fetch_status(repo_id).await
        }
    }

    fn git_repo(root: &Path, name: &str, origin: Option<&str>) {
        let path = root.join(name);
        fs::create_dir_all(&path).unwrap();
        let git = |args: &[&str]| {
            let status = Command::new("git").arg("-C").arg(&path).args(args).status().unwrap();
            assert!(status.success());
        };
        git(&["init", "--quiet"]);
        if let Some(origin) = origin {
            git(&["remote", "add", "origin", origin]);
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    async fn print(root: &Path, source: &CannedSource, recursive: bool) -> String {
        let config = AppConfig { root, recursive, color: false };
        let app = App::new(config, source);
        let mut out = Vec::new();
        app.print_status_table(&mut out, &now()).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_summary_of_two_repositories() {
        let tmp = TempDir::new().unwrap();
        git_repo(tmp.path(), "widget", Some("git@github.com:acme/widget.git"));
        git_repo(tmp.path(), "gizmo", Some("https://github.com/acme/gizmo"));

        let mut source = CannedSource::default();
        source.statuses.insert(RepositoryId::new("acme", "widget"), RemoteStatus::default());
        source.statuses.insert(
            RepositoryId::new("acme", "gizmo"),
            RemoteStatus {
                open_issues: 3,
                open_pull_requests: 1,
                stars: 42,
                release_tag: Some("v1.2.0".to_owned()),
                released_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()),
                last_activity_at: Some(now() - Duration::days(3)),
            },
        );

        let table = print(tmp.path(), &source, false).await;
        assert_eq!(
            table.lines().collect::<Vec<_>>(),
            [
                "ACTIVITY    ISSUES  PR  STAR  REL     RELEASED    REPO",
                "3 days ago       3   1    42  v1.2.0  2024-01-15  acme/gizmo",
                "-                0   0     0  -       -           acme/widget",
            ]
        );
        assert_eq!(
            *source.requested.lock().unwrap(),
            [RepositoryId::new("acme", "gizmo"), RepositoryId::new("acme", "widget")]
        );
    }

    #[tokio::test]
    async fn test_other_hosts_and_missing_remotes_are_skipped_silently() {
        let tmp = TempDir::new().unwrap();
        git_repo(tmp.path(), "elsewhere", Some("git@gitlab.com:acme/elsewhere.git"));
        git_repo(tmp.path(), "local-only", None);
        git_repo(tmp.path(), "widget", Some("git@github.com:acme/widget.git"));

        let mut source = CannedSource::default();
        source.statuses.insert(RepositoryId::new("acme", "widget"), RemoteStatus::default());

        let table = print(tmp.path(), &source, false).await;
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("acme/widget"));
        assert_eq!(*source.requested.lock().unwrap(), [RepositoryId::new("acme", "widget")]);
    }

    #[tokio::test]
    async fn test_failed_fetch_skips_only_that_repository() {
        let tmp = TempDir::new().unwrap();
        git_repo(tmp.path(), "a-broken", Some("git@github.com:acme/broken.git"));
        git_repo(tmp.path(), "b-widget", Some("git@github.com:acme/widget.git"));

        let mut source = CannedSource::default();
        source.statuses.insert(RepositoryId::new("acme", "widget"), RemoteStatus::default());

        let table = print(tmp.path(), &source, false).await;
        assert!(!table.contains("acme/broken"));
        assert!(table.contains("acme/widget"));
        assert_eq!(source.requested.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_recursive_scan() {
        let tmp = TempDir::new().unwrap();
        git_repo(tmp.path(), "group/widget", Some("git@github.com:acme/widget.git"));

        let mut source = CannedSource::default();
        source.statuses.insert(RepositoryId::new("acme", "widget"), RemoteStatus::default());

        let flat = print(tmp.path(), &source, false).await;
        assert_eq!(flat, format!("No git repositories found under {}\n", tmp.path().display()));

        let deep = print(tmp.path(), &source, true).await;
        assert!(deep.contains("acme/widget"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let tmp = TempDir::new().unwrap();
        git_repo(tmp.path(), "elsewhere", Some("git@gitlab.com:acme/elsewhere.git"));

        let table = print(tmp.path(), &CannedSource::default(), false).await;
        assert_eq!(table, "No repository status to show.\n");
    }

    #[test]
    fn test_resolve_root() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file");
        fs::write(&file, "").unwrap();

        assert_eq!(resolve_root(tmp.path()).unwrap(), fs::canonicalize(tmp.path()).unwrap());
        assert!(resolve_root(&tmp.path().join("missing")).is_err());
        let err = resolve_root(&file).unwrap_err();
        let file = fs::canonicalize(&file).unwrap();
        assert_eq!(err.to_string(), format!("Root directory not found: {}", file.display()));
    }

    #[test]
    fn test_root_not_found_reports_absolute_path() {
        let err = resolve_root(Path::new("no-such-ghglance-root")).unwrap_err();
        assert!(err.0.is_absolute());
        assert_eq!(err.0, env::current_dir().unwrap().join("no-such-ghglance-root"));
    }
}
