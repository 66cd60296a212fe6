//! Article extraction from acquired content, and domain validation of the
//! result.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use nt_core::domain::{absolutize, belongs_to};
use nt_core::{
    Article, Error, Extraction, InferenceModel, NoArticlesFound, Result, SearchContext, SearchQuery,
};
use nt_scrappers::dates::parse_loose_date;
use serde::Deserialize;
use url::Url;

use crate::agent::Agent;
use crate::usage::{Usage, UsageLimits};

/// Characters of page text handed to the model.
pub const MAX_PAGE_CHARS: usize = 50_000;

const ARTICLE_SHAPE: &str = "Each article is a JSON object with the fields \
\"title\" (string, required), \"url\" (string, required), \"summary\" (string), \
\"category\" (string), \"publish_date\" (YYYY-MM-DD), \"image_url\" (string) and \
\"authors\" (array of strings). If nothing relevant exists, reply with \
{\"reason\": \"<why>\"} instead.";

const EXTRACTION_SYSTEM: &str = "You are a web scraping assistant that extracts article information \
from HTML content. Always return a valid JSON array of Article objects. Ensure all extracted \
information is accurate and properly formatted.";

const SEARCH_RESULTS_SYSTEM: &str = "You are a search results processor that converts web search \
results into Article objects. Always return a valid JSON array of Article objects. Only include \
results from the specified target domain. Ensure all data is properly formatted and validated.";

const REFINE_SYSTEM: &str = "You are a search query optimizer that converts natural language \
queries into structured search terms. Reply with one JSON object with the fields \"keywords\" \
(array of strings), \"category\" (string or null), \"date_from\" and \"date_to\" (YYYY-MM-DD or \
null).";

/// An article as a model emits it, before any validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
}

impl RawArticle {
    /// Normalizes the record for `ctx`: relative URLs become absolute against
    /// the target URL and `source_domain` is set. Returns `None` when the URL
    /// cannot be made well-formed.
    pub fn into_article(self, ctx: &SearchContext) -> Option<Article> {
        let raw_url = self.url.trim();
        let url = match absolutize(&ctx.target_url, raw_url).map(|u| Url::parse(&u)) {
            Some(Ok(url)) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                tracing::warn!("Dropping article with malformed URL: {}", raw_url);
                return None;
            }
        };

        let image_url = self
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .and_then(|u| absolutize(&ctx.target_url, u))
            .and_then(|u| Url::parse(&u).ok());

        Some(Article {
            title: self.title.trim().to_string(),
            url,
            summary: self.summary.unwrap_or_default(),
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            publish_date: self.publish_date.as_deref().and_then(parse_loose_date),
            image_url,
            authors: self.authors.unwrap_or_default(),
            source_domain: ctx.domain_name.clone(),
        })
    }
}

/// The shapes a model may answer an extraction prompt with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModelArticles {
    List(Vec<RawArticle>),
    NotFound(NoArticlesFound),
    Wrapped { articles: Vec<RawArticle> },
}

impl ModelArticles {
    fn split(self) -> (Vec<RawArticle>, Option<String>) {
        match self {
            ModelArticles::List(articles) | ModelArticles::Wrapped { articles } => (articles, None),
            ModelArticles::NotFound(not_found) => (Vec::new(), Some(not_found.reason)),
        }
    }
}

/// Keeps only articles hosted on `domain`, drops duplicate URLs and turns an
/// empty outcome into a reasoned `NotFound`.
pub fn validate(candidates: Vec<Article>, model_reason: Option<String>, domain: &str) -> Extraction {
    if candidates.is_empty() {
        let reason = model_reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "No articles matched the search criteria".to_string());
        return Extraction::NotFound(NoArticlesFound::new(reason));
    }

    let mut seen = HashSet::new();
    let mut valid = Vec::new();
    for article in candidates {
        if !belongs_to(&article.url, domain) {
            tracing::warn!(
                "Removed article from wrong domain: {} (expected {})",
                article.url,
                domain
            );
            continue;
        }
        if seen.insert(article.url.to_string()) {
            valid.push(article);
        }
    }

    if valid.is_empty() {
        return Extraction::NotFound(NoArticlesFound::new(format!(
            "No valid articles found from {}",
            domain
        )));
    }
    Extraction::Articles(valid)
}

/// Normalizes a model reply. When the model returned records but none of
/// them survived normalization, the domain-specific reason is reported.
fn normalize(reply: ModelArticles, ctx: &SearchContext) -> (Vec<Article>, Option<String>) {
    let (raw, reason) = reply.split();
    let returned = raw.len();
    let articles: Vec<Article> = raw.into_iter().filter_map(|a| a.into_article(ctx)).collect();
    if returned > 0 && articles.is_empty() {
        return (articles, Some(format!("No valid articles found from {}", ctx.domain_name)));
    }
    (articles, reason)
}

fn keywords_hint(refined: Option<&SearchQuery>) -> String {
    match refined {
        Some(query) if !query.keywords.is_empty() => {
            let mut hint = format!("\nKey terms: {}.", query.keywords.join(", "));
            if let Some(category) = &query.category {
                hint.push_str(&format!(" Preferred category: {}.", category));
            }
            hint
        }
        _ => String::new(),
    }
}

/// Turns acquired page text and search hits into validated articles.
pub struct ArticleExtractor {
    model: Arc<dyn InferenceModel>,
    limits: UsageLimits,
    page_agent: Agent<ModelArticles>,
    results_agent: Agent<ModelArticles>,
    refine_agent: Agent<SearchQuery>,
}

impl fmt::Debug for ArticleExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleExtractor")
            .field("model", &self.model.name())
            .field("limits", &self.limits)
            .finish()
    }
}

impl ArticleExtractor {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            page_agent: Agent::new(model.clone(), format!("{} {}", EXTRACTION_SYSTEM, ARTICLE_SHAPE)),
            results_agent: Agent::new(model.clone(), format!("{} {}", SEARCH_RESULTS_SYSTEM, ARTICLE_SHAPE)),
            refine_agent: Agent::new(model.clone(), REFINE_SYSTEM),
            limits: UsageLimits::default(),
            model,
        }
    }

    pub fn with_limits(mut self, limits: UsageLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Runs query refinement and extraction for every acquired source under
    /// one usage budget, then validates the combined candidates.
    pub async fn extract(&self, ctx: &SearchContext) -> Result<Extraction> {
        let usage = Usage::new(self.limits);
        let refined = self.refine_query(ctx, &usage).await?;

        let mut candidates = Vec::new();
        let mut reasons = Vec::new();

        if ctx.has_page_text() {
            let (articles, reason) = self.from_webpage(ctx, refined.as_ref(), &usage).await?;
            tracing::info!("Found {} articles from webpage", articles.len());
            candidates.extend(articles);
            reasons.extend(reason);
        }

        if !ctx.search_hits().is_empty() {
            let (articles, reason) = self.from_search_results(ctx, &usage).await?;
            tracing::info!("Found {} articles from web search", articles.len());
            candidates.extend(articles);
            reasons.extend(reason);
        }

        tracing::debug!("Extraction used {} model requests", usage.requests());
        Ok(validate(candidates, reasons.into_iter().next(), &ctx.domain_name))
    }

    /// Advisory only: a reply that cannot be parsed or a failing model is
    /// logged and ignored. Budget exhaustion still ends the request.
    pub async fn refine_query(&self, ctx: &SearchContext, usage: &Usage) -> Result<Option<SearchQuery>> {
        match self.refine_agent.run(&ctx.search_term, usage).await {
            Ok(query) => {
                tracing::info!("Refined search query: {:?}", query);
                Ok(Some(query))
            }
            Err(e @ Error::UsageLimitExceeded { .. }) => Err(e),
            Err(e) => {
                tracing::warn!("Query refinement skipped: {}", e);
                Ok(None)
            }
        }
    }

    async fn from_webpage(
        &self,
        ctx: &SearchContext,
        refined: Option<&SearchQuery>,
        usage: &Usage,
    ) -> Result<(Vec<Article>, Option<String>)> {
        let page: String = ctx.web_page_text.chars().take(MAX_PAGE_CHARS).collect();
        let prompt = format!(
            "Extract articles from this webpage content that are relevant to the search query: '{}'. \
             The webpage is from {}.{}\n\n{}",
            ctx.search_term,
            ctx.domain_name,
            keywords_hint(refined),
            page
        );
        Ok(normalize(self.page_agent.run(&prompt, usage).await?, ctx))
    }

    async fn from_search_results(&self, ctx: &SearchContext, usage: &Usage) -> Result<(Vec<Article>, Option<String>)> {
        let hits = serde_json::to_string_pretty(ctx.search_hits())?;
        let prompt = format!(
            "Extract articles from these search results that are relevant to: '{}'. \
             Only include results from {}.\n\n{}",
            ctx.search_term, ctx.domain_name, hits
        );
        Ok(normalize(self.results_agent.run(&prompt, usage).await?, ctx))
    }
}
