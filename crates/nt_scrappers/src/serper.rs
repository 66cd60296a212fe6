use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use nt_core::{Error, Result, SearchHit, WebSearch};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";
pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";
pub const MAX_RESULTS: u32 = 10;

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: String,
    gl: &'a str,
    hl: &'a str,
    num: u32,
}

#[derive(Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

/// Serper.dev Google search, restricted to one site with `site:`.
pub struct SerperSearch {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl SerperSearch {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: SERPER_ENDPOINT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Returns `None` when no credential is configured.
    pub fn from_key(client: Client, api_key: Option<String>) -> Option<Self> {
        api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| Self::new(client, key))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for SerperSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerperSearch")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Keeps hits whose link mentions `domain`. The API does not always honour
/// the `site:` qualifier.
pub fn filter_domain_hits(hits: Vec<SearchHit>, domain: &str) -> Vec<SearchHit> {
    hits.into_iter()
        .filter(|hit| hit.link.to_lowercase().contains(domain))
        .collect()
}

#[async_trait]
impl WebSearch for SerperSearch {
    fn name(&self) -> &str {
        "Serper"
    }

    async fn search_site(&self, query: &str, domain: &str) -> Result<Vec<SearchHit>> {
        let request = SerperRequest {
            q: format!("{} site:{}", query, domain),
            gl: "us",
            hl: "en",
            num: MAX_RESULTS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Search(format!("Error fetching Serper results: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Search(format!("Serper API error: {} {}", status.as_u16(), body)));
        }

        let data: SerperResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("Failed to parse Serper response: {}", e)))?;

        let hits = filter_domain_hits(data.organic, domain);
        tracing::info!("Serper returned {} results for {}", hits.len(), domain);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hit(link: &str) -> SearchHit {
        SearchHit {
            title: "t".to_string(),
            link: link.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_domain_hits() {
        let hits = vec![
            hit("https://www.BBC.com/news/a"),
            hit("https://cnn.com/b"),
            hit("https://bbc.com/c"),
        ];
        let kept = filter_domain_hits(hits, "bbc.com");
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|h| h.link.to_lowercase().contains("bbc.com")));
    }

    #[test]
    fn test_missing_key_skips_provider() {
        assert!(SerperSearch::from_key(Client::new(), None).is_none());
        assert!(SerperSearch::from_key(Client::new(), Some("  ".to_string())).is_none());
        assert!(SerperSearch::from_key(Client::new(), Some("key".to_string())).is_some());
    }

    #[test]
    fn test_debug_redacts_key() {
        let search = SerperSearch::new(Client::new(), "secret-key");
        assert!(!format!("{:?}", search).contains("secret-key"));
    }

    #[tokio::test]
    async fn test_search_site_sends_site_query_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("X-API-KEY", "test-key"))
            .and(body_partial_json(json!({
                "q": "inflation site:example.com",
                "gl": "us",
                "hl": "en",
                "num": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "organic": [
                    {"title": "On site", "link": "https://www.example.com/inflation", "snippet": "s"},
                    {"title": "Off site", "link": "https://other.org/inflation", "snippet": "s"}
                ]
            })))
            .mount(&server)
            .await;

        let search = SerperSearch::new(Client::new(), "test-key")
            .with_endpoint(format!("{}/search", server.uri()));
        let hits = search.search_site("inflation", "example.com").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "On site");
    }

    #[tokio::test]
    async fn test_search_site_non_200_is_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("bad key"))
            .mount(&server)
            .await;

        let search = SerperSearch::new(Client::new(), "test-key").with_endpoint(server.uri());
        let err = search.search_site("inflation", "example.com").await.unwrap_err();
        assert!(matches!(err, Error::Search(msg) if msg.contains("403")));
    }
}
