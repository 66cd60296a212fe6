use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

fn default_category() -> String {
    "Unknown".to_string()
}

/// An article discovered on a target site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: Url,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub publish_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: Option<Url>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub source_domain: String,
}

impl Article {
    pub fn new(title: impl Into<String>, url: Url) -> Self {
        Self {
            title: title.into(),
            url,
            summary: String::new(),
            category: default_category(),
            publish_date: None,
            image_url: None,
            authors: Vec::new(),
            source_domain: String::new(),
        }
    }
}

/// A valid zero-result answer, as opposed to a pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoArticlesFound {
    pub reason: String,
}

impl NoArticlesFound {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outcome of the extraction pipeline. `Articles` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Articles(Vec<Article>),
    NotFound(NoArticlesFound),
}

impl Extraction {
    pub fn articles(&self) -> &[Article] {
        match self {
            Extraction::Articles(articles) => articles,
            Extraction::NotFound(_) => &[],
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Extraction::Articles(_))
    }
}

/// Structured refinement of a free-text query. Advisory only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

/// One organic result returned by a web search provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

/// How content is acquired for a search request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    DirectScrape,
    Serper,
    #[default]
    Combined,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::DirectScrape => "direct_scrape",
            SearchMethod::Serper => "serper",
            SearchMethod::Combined => "combined",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct_scrape" => Ok(SearchMethod::DirectScrape),
            "serper" => Ok(SearchMethod::Serper),
            "combined" | "" => Ok(SearchMethod::Combined),
            other => Err(Error::InvalidMethod(other.to_string())),
        }
    }
}

/// Everything one search request knows about its target. Built once per
/// request and dropped when the request ends.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub web_page_text: String,
    pub search_term: String,
    pub target_url: String,
    pub search_results: Option<Vec<SearchHit>>,
    pub domain_name: String,
}

impl SearchContext {
    pub fn has_page_text(&self) -> bool {
        !self.web_page_text.trim().is_empty()
    }

    pub fn search_hits(&self) -> &[SearchHit] {
        self.search_results.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSource {
    pub name: String,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSourceList {
    #[serde(default)]
    pub sources: Vec<NewsSource>,
}
