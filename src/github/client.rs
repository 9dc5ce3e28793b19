use super::{
    auth::Authentication,
    error::Error,
    pagination::{next_page_url, paginate},
    responses::{Issue, PullRequest, Release, Repository},
};
use crate::{app::StatusSource, types::RemoteStatus, RepositoryId};
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use http::{
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
    HeaderMap, HeaderValue,
};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

type ClientResult<T> = Result<T, Error>;

const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Maximum page size GitHub allows.
const PER_PAGE: &str = "100";

/// GitHub REST client, queries one endpoint per piece of status.
#[derive(Debug)]
pub struct GhClient {
    base_url: Url,
    http: Client,
}

impl GhClient {
    /// Creates a client, anonymous when `credential` is `None`.
    pub fn new(
        base_url: impl Into<Option<Url>>,
        credential: Option<&dyn Authentication>,
    ) -> ClientResult<Self> {
        let base_url: Url = match base_url.into() {
            Some(x) => x,
            None => DEFAULT_BASE_URL.parse()?,
        };

        let headers = {
            let mut headers = HeaderMap::new();

            let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

            if let Some(credential) = credential {
                let mut authorization = HeaderValue::from_str(&credential.to_authz_value())?;
                authorization.set_sensitive(true);
                headers.insert(AUTHORIZATION, authorization);
            }

            headers.insert(ACCEPT, "application/vnd.github+json".try_into()?);

            headers
        };

        let http = ClientBuilder::new().default_headers(headers).build()?;

        let client = GhClient { base_url, http };
        debug!(?client);

        Ok(client)
    }

    fn build_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    fn build_listing_url(&self, path: &str) -> Url {
        let mut url = self.build_url(path);
        url.query_pairs_mut().append_pair("state", "open").append_pair("per_page", PER_PAGE);
        url
    }

    async fn get(&self, url: Url) -> ClientResult<Response> {
        let request = self.http.get(url);
        debug!(?request, "sending request");
        let response = request.send().await?;
        debug!(?response, "received response");
        Ok(response)
    }

    async fn get_page<T>(&self, url: Url) -> ClientResult<(Vec<T>, Option<Url>)>
    where
        T: DeserializeOwned,
    {
        let response = ensure_success(self.get(url.clone()).await?)?;
        let next_page_url = next_page_url(&url, response.headers())?;
        let items: Vec<T> = response.json().await?;
        debug!(count = items.len(), ?next_page_url, "received page");
        Ok((items, next_page_url))
    }

    /// List repository issues, pull requests included.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/issues/issues#list-repository-issues
    pub fn list_open_issues<'a>(
        &'a self,
        owner: &str,
        repo: &str,
    ) -> impl Stream<Item = ClientResult<Issue>> + 'a {
        let url = self.build_listing_url(&format!("/repos/{owner}/{repo}/issues"));
        paginate(url, move |url| self.get_page::<Issue>(url))
    }

    /// List pull requests.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/pulls/pulls#list-pull-requests
    pub fn list_open_pull_requests<'a>(
        &'a self,
        owner: &str,
        repo: &str,
    ) -> impl Stream<Item = ClientResult<PullRequest>> + 'a {
        let url = self.build_listing_url(&format!("/repos/{owner}/{repo}/pulls"));
        paginate(url, move |url| self.get_page::<PullRequest>(url))
    }

    /// Get a repository.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/repos/repos#get-a-repository
    pub async fn get_repository(&self, owner: &str, repo: &str) -> ClientResult<Repository> {
        let url = self.build_url(&format!("/repos/{owner}/{repo}"));
        let response = ensure_success(self.get(url).await?)?;
        let response_body: Repository = response.json().await?;
        debug!(?response_body, "response body");
        Ok(response_body)
    }

    /// Get the latest release, `None` when the repository has not published one.
    ///
    /// [GitHub Docs].
    ///
    /// [GitHub Docs]: https://docs.github.com/en/rest/releases/releases#get-the-latest-release
    pub async fn get_latest_release(
        &self,
        owner: &str,
        repo: &str,
    ) -> ClientResult<Option<Release>> {
        let url = self.build_url(&format!("/repos/{owner}/{repo}/releases/latest"));
        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response)?;
        let response_body: Release = response.json().await?;
        debug!(?response_body, "response body");
        Ok(Some(response_body))
    }
}

fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::from_status(status))
    }
}

#[async_trait]
impl StatusSource for GhClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_status(&self, repo_id: &RepositoryId) -> ClientResult<RemoteStatus> {
        let RepositoryId { owner, name } = repo_id;

        let issues: Vec<Issue> = self.list_open_issues(owner, name).try_collect().await?;
        let pulls: Vec<PullRequest> =
            self.list_open_pull_requests(owner, name).try_collect().await?;
        let repo = self.get_repository(owner, name).await?;
        let release = self.get_latest_release(owner, name).await?;

        let open_issues = issues.iter().filter(|x| !x.is_pull_request()).count();
        let (release_tag, released_at) = match release {
            Some(Release { tag_name, created_at }) => (tag_name, created_at),
            None => (None, None),
        };
        let status = RemoteStatus {
            open_issues: open_issues as u64,
            open_pull_requests: pulls.len() as u64,
            stars: repo.stargazers_count,
            release_tag,
            released_at,
            last_activity_at: repo.pushed_at,
        };
        Ok(status)
    }
}
