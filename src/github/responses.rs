use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Item of the issues listing, which includes pull requests.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Issue {
    /// Present only when the item is a pull request.
    pub pull_request: Option<Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Item of the pulls listing, only counted.
#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct PullRequest {}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Repository {
    #[serde(default)]
    pub stargazers_count: u64,
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize, PartialEq, Clone, Debug)]
pub struct Release {
    pub tag_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[test]
fn test_listing_items_need_no_fields() {
    let issues: Vec<Issue> = serde_json::from_str(r#"[{}, {"pull_request": {"url": "x"}}]"#).unwrap();
    assert_eq!(issues.iter().filter(|x| x.is_pull_request()).count(), 1);
    let pulls: Vec<PullRequest> = serde_json::from_str(r#"[{}, {"title": "Fix"}]"#).unwrap();
    assert_eq!(pulls.len(), 2);
}
