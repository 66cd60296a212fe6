//! Locates a site's own search results page by probing common URL layouts.

use nt_core::{Error, Result};
use url::Url;

use crate::fetch::PageFetcher;

/// Minimum body length, in characters, for a page to count as results.
pub const MIN_RESULTS_LENGTH: usize = 1000;

const RESULT_PHRASES: &[&str] = &["search results", "search result"];

/// Search URL layouts, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTemplate {
    QueryQ,
    QueryQuery,
    QueryS,
    QueryKeyword,
    PathSegment,
    RootS,
}

impl SearchTemplate {
    pub const ORDER: [SearchTemplate; 6] = [
        SearchTemplate::QueryQ,
        SearchTemplate::QueryQuery,
        SearchTemplate::QueryS,
        SearchTemplate::QueryKeyword,
        SearchTemplate::PathSegment,
        SearchTemplate::RootS,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchTemplate::QueryQ => "search?q",
            SearchTemplate::QueryQuery => "search?query",
            SearchTemplate::QueryS => "search?s",
            SearchTemplate::QueryKeyword => "search?keyword",
            SearchTemplate::PathSegment => "search/<query>",
            SearchTemplate::RootS => "?s",
        }
    }

    /// Builds the candidate URL. `origin` is `scheme://host[:port]` and
    /// `query` is already percent-encoded.
    pub fn render(&self, origin: &str, query: &str) -> String {
        match self {
            SearchTemplate::QueryQ => format!("{}/search?q={}", origin, query),
            SearchTemplate::QueryQuery => format!("{}/search?query={}", origin, query),
            SearchTemplate::QueryS => format!("{}/search?s={}", origin, query),
            SearchTemplate::QueryKeyword => format!("{}/search?keyword={}", origin, query),
            SearchTemplate::PathSegment => format!("{}/search/{}", origin, query),
            SearchTemplate::RootS => format!("{}/?s={}", origin, query),
        }
    }
}

/// A page accepted as the site's search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub template: SearchTemplate,
    pub url: String,
    pub html: String,
}

/// All candidate search URLs for `base_url`, in the order they are tried.
pub fn candidate_urls(base_url: &str, query: &str) -> Result<Vec<(SearchTemplate, String)>> {
    let parsed = Url::parse(base_url).map_err(|e| Error::InvalidUrl(format!("{}: {}", base_url, e)))?;
    if parsed.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("{} has no host", base_url)));
    }
    let origin = parsed.origin().ascii_serialization();
    let encoded = urlencoding::encode(query);

    Ok(SearchTemplate::ORDER
        .iter()
        .map(|template| (*template, template.render(&origin, &encoded)))
        .collect())
}

/// Heuristic for "this 200 response is a results page".
pub fn looks_like_results(body: &str, query: &str) -> bool {
    if body.chars().count() <= MIN_RESULTS_LENGTH {
        return false;
    }
    let lowered = body.to_lowercase();
    let query = query.trim().to_lowercase();
    (!query.is_empty() && lowered.contains(&query)) || RESULT_PHRASES.iter().any(|p| lowered.contains(p))
}

/// Probes each template in order and returns the first page that looks like
/// search results. Failures of single candidates are skipped; `None` means
/// the caller should fall back to the homepage.
pub async fn discover_search_page(fetcher: &PageFetcher, base_url: &str, query: &str) -> Option<SearchPage> {
    let candidates = match candidate_urls(base_url, query) {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!("Cannot build search URLs for {}: {}", base_url, e);
            return None;
        }
    };

    for (template, url) in candidates {
        match fetcher.get(&url).await {
            Ok(page) if page.is_ok() && looks_like_results(&page.body, query) => {
                tracing::info!("Found search results at {} ({})", url, template.name());
                return Some(SearchPage {
                    template,
                    url,
                    html: page.body,
                });
            }
            Ok(page) => {
                tracing::debug!("Rejected search candidate {} (status {})", url, page.status);
            }
            Err(e) => {
                tracing::debug!("Search candidate {} failed: {}", url, e);
            }
        }
    }

    tracing::warn!("No search page found for {}", base_url);
    None
}
