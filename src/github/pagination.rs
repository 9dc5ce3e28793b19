//! Follows `rel="next"` links of paginated GitHub responses.
//!
//! [GitHub Docs].
//!
//! [GitHub Docs]: https://docs.github.com/en/rest/using-the-rest-api/using-pagination-in-the-rest-api

use super::error::Error;
use async_stream::try_stream;
use futures::{Future, Stream};
use http::{header::LINK, HeaderMap};
use http_link::{parse_link_header, ParseLinkError};
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

/// Finds the `rel="next"` target in the `Link` headers of a response to `requested`.
///
/// Relative targets are resolved against `requested`. A malformed header is an error rather than
/// the end of the listing.
pub fn next_page_url(requested: &Url, headers: &HeaderMap) -> Result<Option<Url>, ParseLinkError> {
    for value in headers.get_all(LINK) {
        let value = match value.to_str() {
            Ok(x) if !x.trim().is_empty() => x,
            _ => continue,
        };
        let links = parse_link_header(value, requested)?;
        if let Some(link) = links.into_iter().find(|x| x.rel == "next") {
            return Ok(Some(link.target));
        }
    }
    Ok(None)
}

/// Lazily fetches pages starting at `first`, yielding their items in page order.
///
/// `fetch_page` returns the items of a page and the url of the page after it. Fetching stops
/// at the first page without a next url, at the first error, or when a next url repeats a
/// page already fetched.
pub fn paginate<'a, T, F, Fut>(first: Url, fetch_page: F) -> impl Stream<Item = Result<T, Error>> + 'a
where
    T: 'a,
    F: Fn(Url) -> Fut + 'a,
    Fut: Future<Output = Result<(Vec<T>, Option<Url>), Error>> + 'a,
{
    try_stream! {
        let mut visited = HashSet::new();
        let mut cursor = Some(first);
        while let Some(url) = cursor.take() {
            visited.insert(url.clone());
            debug!(%url, "fetching page");
            let (items, next) = fetch_page(url).await?;
            for item in items {
                yield item;
            }
            cursor = match next {
                Some(next) if visited.contains(&next) => {
                    warn!(%next, "next page was already fetched");
                    None
                }
                next => next,
            };
        }
    }
}
