//! Chains the sources service and the scraper service over HTTP.

use std::collections::HashSet;
use std::time::Duration;

use nt_core::{NewsSource, SearchMethod};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

use crate::config::ServiceConfig;
use crate::error::ApiError;

pub const COORDINATED_DOMAIN: &str = "Multiple Sources";

#[derive(Debug, Deserialize)]
struct SourcesAnswer {
    answer: SourcesBody,
}

#[derive(Debug, Deserialize)]
struct SourcesBody {
    sources: Vec<NewsSource>,
}

#[derive(Debug, Deserialize)]
struct ScraperReply {
    #[serde(default)]
    articles: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Coordinated {
    pub sources: Vec<NewsSource>,
    pub articles: Vec<Value>,
    pub count: usize,
    pub domain: String,
}

/// Network location of a source URL, used to search each site once.
fn netloc(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.host_str().map(|host| match u.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            })
        })
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct Coordinator {
    client: Client,
    sources_url: String,
    scraper_url: String,
    sources_timeout: Duration,
    search_timeout: Duration,
}

impl Coordinator {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            sources_url: config.sources_url.trim_end_matches('/').to_string(),
            scraper_url: config.scraper_url.trim_end_matches('/').to_string(),
            sources_timeout: config.sources_timeout,
            search_timeout: config.search_timeout,
        }
    }

    async fn fetch_sources(&self, question: &str) -> Result<Vec<NewsSource>, ApiError> {
        let fetch_error = |e: reqwest::Error| ApiError::InternalError(format!("Error fetching data: {}", e));

        let response = self
            .client
            .post(format!("{}/sources", self.sources_url))
            .json(&json!({ "question": question }))
            .timeout(self.sources_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(fetch_error)?;

        let body = response.bytes().await.map_err(fetch_error)?;
        let answer: SourcesAnswer = serde_json::from_slice(&body)
            .map_err(|_| ApiError::InvalidRequest("No valid sources found".to_string()))?;
        if answer.answer.sources.is_empty() {
            return Err(ApiError::InvalidRequest("No valid sources found".to_string()));
        }
        Ok(answer.answer.sources)
    }

    async fn search_source(&self, source: &NewsSource, question: &str) -> reqwest::Result<Vec<Value>> {
        let reply: ScraperReply = self
            .client
            .get(format!("{}/search", self.scraper_url))
            .query(&[
                ("url", source.url.as_str()),
                ("query", question),
                ("method", SearchMethod::Combined.as_str()),
            ])
            .timeout(self.search_timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.articles)
    }

    /// Asks for sources, then searches each distinct site in turn. A site
    /// that fails is logged and left out of the result.
    pub async fn coordinate(&self, question: &str) -> Result<Coordinated, ApiError> {
        let sources = self.fetch_sources(question).await?;
        tracing::info!("Coordinating search over {} sources", sources.len());

        let mut seen = HashSet::new();
        let mut articles = Vec::new();
        for source in &sources {
            if !seen.insert(netloc(&source.url)) {
                continue;
            }
            match self.search_source(source, question).await {
                Ok(found) => {
                    tracing::info!("{} returned {} articles", source.url, found.len());
                    articles.extend(found);
                }
                Err(e) => tracing::warn!("Error processing source {}: {}", source.url, e),
            }
        }

        Ok(Coordinated {
            count: articles.len(),
            sources,
            articles,
            domain: COORDINATED_DOMAIN.to_string(),
        })
    }
}
