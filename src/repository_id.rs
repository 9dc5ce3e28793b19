use anyhow::{bail, Error};
use core::fmt;
use std::str::FromStr;

/// Host the remote identity is extracted for.
pub const GITHUB_HOST: &str = "github.com";

/// Owner and name of a repository hosted on GitHub.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self { owner, name }
    }

    /// Extracts the GitHub identity from a remote url.
    ///
    /// Understands the scp-like ssh form (`git@github.com:owner/name.git`) and anything
    /// containing `github.com/` (https, `ssh://`, `git://`). Returns `None` for other hosts
    /// and for paths that don't have exactly an owner and a name.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let path = match scp_like_path(url) {
            Some(path) => path,
            None => {
                let marker = format!("{GITHUB_HOST}/");
                let start = url.find(&marker)? + marker.len();
                &url[start..]
            }
        };
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        path.parse().ok()
    }
}

/// Returns the path part of `login@github.com:path`.
fn scp_like_path(url: &str) -> Option<&str> {
    let (authority, path) = url.split_once(':')?;
    let (login, host) = authority.split_once('@')?;
    if login.is_empty() || login.contains('/') || host != GITHUB_HOST {
        return None;
    }
    Some(path)
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments = s.split('/');
        let r = match (segments.next(), segments.next(), segments.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Self::new(owner, name)
            }
            _ => bail!("Expecting in `:owner/:name` format, but was `{}`.", s),
        };
        Ok(r)
    }
}

#[cfg(test)]
#[test]
fn test_repository_id_display() {
    assert_eq!(RepositoryId::new("acme", "widget").to_string(), "acme/widget");
}

#[cfg(test)]
#[test]
fn test_parse_repository_id() {
    // trivial case
    assert_eq!(RepositoryId::new("acme", "widget"), "acme/widget".parse().unwrap());
    // missing owner
    assert_eq!(
        "Expecting in `:owner/:name` format, but was `widget`.",
        "widget".parse::<RepositoryId>().unwrap_err().to_string()
    );
    // missing name
    assert_eq!(
        "Expecting in `:owner/:name` format, but was `acme/`.",
        "acme/".parse::<RepositoryId>().unwrap_err().to_string()
    );
    // double separator
    assert_eq!(
        "Expecting in `:owner/:name` format, but was `acme/wid/get`.",
        "acme/wid/get".parse::<RepositoryId>().unwrap_err().to_string()
    );
}
