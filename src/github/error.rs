use reqwest::StatusCode;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Failure to fetch the status of one repository.
#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error {}: {reason}", .status.as_u16())]
    Status { status: StatusCode, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("malformed Link header: {0}")]
    Link(#[from] http_link::ParseLinkError),

    #[error("failed to run `{}`: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },

    #[error("{0}")]
    Client(String),

    #[error("gh api returned no output")]
    EmptyOutput,

    #[error("repository not found or access denied")]
    NotFound,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Creates a status error from a non-success HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Unknown").to_owned();
        Self::Status { status, reason }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
#[test]
fn test_status_error_message() {
    let err = Error::from_status(StatusCode::FORBIDDEN);
    assert_eq!(err.to_string(), "GitHub API error 403: Forbidden");
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
}
