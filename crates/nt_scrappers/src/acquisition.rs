//! Content acquisition for one search request.
//!
//! Each [`SearchMethod`] maps to an ordered plan of named strategies. A plan
//! also records which strategy failures end the request: a method that was
//! explicitly asked for fails with its only avenue, while `combined`
//! tolerates the failure of either avenue and only fails when both came back
//! empty.

use std::sync::Arc;

use nt_core::{domain, Error, Result, SearchContext, SearchHit, SearchMethod, WebSearch};

use crate::discovery::discover_search_page;
use crate::fetch::PageFetcher;
use crate::logging::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Probe the site's own search page.
    SiteSearch,
    /// Fetch the plain homepage, unless a search page was already found.
    Homepage,
    /// Ask the third-party web search for on-site results.
    WebSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Fatal,
    Tolerated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionPlan {
    method: SearchMethod,
    steps: Vec<Strategy>,
}

impl AcquisitionPlan {
    pub fn for_method(method: SearchMethod) -> Self {
        let steps = match method {
            SearchMethod::DirectScrape => vec![Strategy::SiteSearch, Strategy::Homepage],
            SearchMethod::Serper => vec![Strategy::WebSearch],
            SearchMethod::Combined => vec![Strategy::SiteSearch, Strategy::Homepage, Strategy::WebSearch],
        };
        Self { method, steps }
    }

    pub fn method(&self) -> SearchMethod {
        self.method
    }

    pub fn steps(&self) -> &[Strategy] {
        &self.steps
    }

    pub fn on_failure(&self, strategy: Strategy) -> FailurePolicy {
        match (self.method, strategy) {
            (SearchMethod::DirectScrape, Strategy::Homepage) => FailurePolicy::Fatal,
            (SearchMethod::Serper, Strategy::WebSearch) => FailurePolicy::Fatal,
            _ => FailurePolicy::Tolerated,
        }
    }
}

/// Where the page text of an acquisition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    SearchPage(String),
    Homepage,
}

#[derive(Debug, Clone, Default)]
pub struct Acquired {
    pub page_text: String,
    pub page_source: Option<PageSource>,
    pub search_hits: Option<Vec<SearchHit>>,
}

impl Acquired {
    pub fn is_empty(&self) -> bool {
        self.page_text.is_empty() && self.search_hits.as_ref().map_or(true, |hits| hits.is_empty())
    }

    pub fn into_context(self, target_url: &str, query: &str, domain: &str) -> SearchContext {
        SearchContext {
            web_page_text: self.page_text,
            search_term: query.to_string(),
            target_url: target_url.to_string(),
            search_results: self.search_hits,
            domain_name: domain.to_string(),
        }
    }
}

/// Runs acquisition plans with an injected page fetcher and optional web
/// search. A missing web search means no credential was configured.
#[derive(Debug, Clone)]
pub struct ContentAcquirer {
    fetcher: PageFetcher,
    web_search: Option<Arc<dyn WebSearch>>,
}

impl ContentAcquirer {
    pub fn new(fetcher: PageFetcher, web_search: Option<Arc<dyn WebSearch>>) -> Self {
        Self { fetcher, web_search }
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    pub async fn acquire(&self, url: &str, query: &str, method: SearchMethod) -> Result<Acquired> {
        let domain = domain::check_allowed(url)?;
        let plan = AcquisitionPlan::for_method(method);
        let logger = Logger::new()
            .with_prefix(format!("[{}]", domain))
            .with_prefix(method.to_string());

        let mut acquired = Acquired::default();
        for step in plan.steps() {
            match step {
                Strategy::SiteSearch => {
                    if let Some(page) = discover_search_page(&self.fetcher, url, query).await {
                        acquired.page_text = page.html;
                        acquired.page_source = Some(PageSource::SearchPage(page.url));
                    }
                }
                Strategy::Homepage => {
                    if !acquired.page_text.is_empty() {
                        continue;
                    }
                    match self.fetcher.fetch_homepage(url).await {
                        Ok(html) => {
                            acquired.page_text = html;
                            acquired.page_source = Some(PageSource::Homepage);
                        }
                        Err(e) => {
                            logger.error(&format!("Error fetching website: {}", e));
                            if plan.on_failure(*step) == FailurePolicy::Fatal {
                                return Err(e);
                            }
                        }
                    }
                }
                Strategy::WebSearch => {
                    let hits = match &self.web_search {
                        None => {
                            logger.warn("Web search API key not found, skipping web search");
                            Vec::new()
                        }
                        Some(search) => match search.search_site(query, &domain).await {
                            Ok(hits) => hits,
                            Err(e) => {
                                logger.error(&format!("{} search failed: {}", search.name(), e));
                                if plan.on_failure(*step) == FailurePolicy::Fatal {
                                    return Err(e);
                                }
                                Vec::new()
                            }
                        },
                    };
                    acquired.search_hits = Some(hits);
                }
            }
        }

        if acquired.is_empty() {
            let message = match method {
                SearchMethod::DirectScrape => format!("Failed to fetch content from {}", url),
                SearchMethod::Serper => format!("No web search results found for {}", domain),
                SearchMethod::Combined => {
                    format!("Failed to fetch content from both {} and web search", domain)
                }
            };
            return Err(Error::NoContent(message));
        }

        logger.info(&format!(
            "Acquired {} characters of page text and {} search results",
            acquired.page_text.chars().count(),
            acquired.search_hits.as_ref().map_or(0, |hits| hits.len())
        ));
        Ok(acquired)
    }
}
