//! Finds local git checkouts and reads where they were cloned from.

use std::{
    fs,
    path::{Path, PathBuf},
};
use tokio::process::Command;
use tracing::debug;

/// Name of the entry that marks a directory as a git working copy.
///
/// It is a directory for regular checkouts and a file for worktrees and submodules.
const GIT_DIR: &str = ".git";

/// Creates a lazy sequence of git repositories under `root`.
///
/// Without `recursive` only the immediate children of `root` are considered. With it, every
/// directory under `root` (`root` included) is, and repositories nested inside another
/// repository's working tree are reported as well. Symbolic links are not followed while
/// descending.
pub fn locate_repositories(root: impl Into<PathBuf>, recursive: bool) -> RepositoryLocator {
    RepositoryLocator { recursive, pending: vec![(root.into(), 0)] }
}

/// Iterator returned by [locate_repositories]. Order is unspecified.
#[derive(Debug)]
pub struct RepositoryLocator {
    recursive: bool,
    /// Directories yet to be visited, with their depth below the root.
    pending: Vec<(PathBuf, usize)>,
}

impl RepositoryLocator {
    fn descend(&mut self, dir: &Path, depth: usize) {
        let entries = match fs::read_dir(dir) {
            Ok(x) => x,
            Err(err) => {
                debug!(?dir, %err, "skipping unreadable directory");
                return;
            }
        };
        for entry in entries.flatten() {
            if entry.file_name() == GIT_DIR {
                continue;
            }
            // the non recursive scan follows links to its children, the recursive scan never does
            let is_dir = if self.recursive {
                entry.file_type().map(|x| x.is_dir()).unwrap_or_default()
            } else {
                entry.path().is_dir()
            };
            if is_dir {
                self.pending.push((entry.path(), depth + 1));
            }
        }
    }
}

impl Iterator for RepositoryLocator {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((dir, depth)) = self.pending.pop() {
            if self.recursive || depth == 0 {
                self.descend(&dir, depth);
            }
            let candidate = self.recursive || depth == 1;
            if candidate && dir.join(GIT_DIR).exists() {
                return Some(dir);
            }
        }
        None
    }
}

/// Reads `remote.origin.url` of the repository at `repo_path`.
///
/// A missing remote, a failing git invocation or a missing git executable all yield `None`.
pub async fn read_origin_url(repo_path: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(["config", "--get", "remote.origin.url"])
        .output()
        .await;
    let output = match output {
        Ok(x) => x,
        Err(err) => {
            debug!(?repo_path, %err, "failed to run git");
            return None;
        }
    };
    if !output.status.success() {
        debug!(?repo_path, status = ?output.status, "repository has no origin remote");
        return None;
    }
    let url = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process;
    use tempfile::TempDir;

    fn mkrepo(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.join(GIT_DIR)).unwrap();
        path
    }

    fn located(root: &Path, recursive: bool) -> Vec<PathBuf> {
        let mut repos: Vec<_> = locate_repositories(root, recursive).collect();
        repos.sort();
        repos
    }

    #[test]
    fn test_children_only_without_recursion() {
        let tmp = TempDir::new().unwrap();
        let a = mkrepo(tmp.path(), "a");
        let b = mkrepo(tmp.path(), "b");
        mkrepo(tmp.path(), "group/deep");
        fs::create_dir_all(tmp.path().join("plain")).unwrap();
        fs::write(tmp.path().join("file.txt"), "hello").unwrap();

        assert_eq!(located(tmp.path(), false), vec![a, b]);
    }

    #[test]
    fn test_root_itself_is_not_a_child() {
        let tmp = TempDir::new().unwrap();
        let root = mkrepo(tmp.path(), "root");
        let child = mkrepo(&root, "child");

        assert_eq!(located(&root, false), vec![child]);
    }

    #[test]
    fn test_recursion_finds_nested_repositories() {
        let tmp = TempDir::new().unwrap();
        let outer = mkrepo(tmp.path(), "outer");
        let inner = mkrepo(tmp.path(), "outer/vendor/inner");
        let deep = mkrepo(tmp.path(), "group/sub/deep");

        assert_eq!(located(tmp.path(), true), vec![deep, outer, inner]);
    }

    #[test]
    fn test_recursion_includes_root() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(GIT_DIR)).unwrap();
        let child = mkrepo(tmp.path(), "child");

        assert_eq!(located(tmp.path(), true), vec![tmp.path().to_path_buf(), child]);
    }

    #[test]
    fn test_recursion_skips_git_metadata() {
        let tmp = TempDir::new().unwrap();
        let repo = mkrepo(tmp.path(), "repo");
        fs::create_dir_all(repo.join(".git/modules/sub/.git")).unwrap();

        assert_eq!(located(tmp.path(), true), vec![repo]);
    }

    #[test]
    fn test_git_file_marks_repository() {
        let tmp = TempDir::new().unwrap();
        let worktree = tmp.path().join("worktree");
        fs::create_dir_all(&worktree).unwrap();
        fs::write(worktree.join(GIT_DIR), "gitdir: ../main/.git/worktrees/worktree").unwrap();

        assert_eq!(located(tmp.path(), false), vec![worktree.clone()]);
        assert_eq!(located(tmp.path(), true), vec![worktree]);
    }

    #[test]
    fn test_empty_root() {
        let tmp = TempDir::new().unwrap();
        assert!(located(tmp.path(), false).is_empty());
        assert!(located(tmp.path(), true).is_empty());
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = process::Command::new("git").arg("-C").arg(dir).args(args).status().unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_read_origin_url() {
        let tmp = TempDir::new().unwrap();
        git(tmp.path(), &["init", "--quiet"]);
        assert_eq!(read_origin_url(tmp.path()).await, None);

        git(tmp.path(), &["remote", "add", "origin", "git@github.com:acme/widget.git"]);
        assert_eq!(
            read_origin_url(tmp.path()).await.as_deref(),
            Some("git@github.com:acme/widget.git")
        );
    }

    #[tokio::test]
    async fn test_read_origin_url_outside_repository() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert_eq!(read_origin_url(&missing).await, None);
    }
}
