use std::time::Duration;

use nt_core::{domain, Error, Result};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use url::Url;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// A fetched page before any status handling.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Fetches site pages while presenting itself as a desktop browser.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self::with_client(client, timeout))
    }

    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url` with browser headers. Transport failures, timeouts included,
    /// map to `Error::FetchTransport`; the status is returned untouched.
    pub async fn get(&self, url: &str) -> Result<FetchedPage> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))?;

        let transport = |e: reqwest::Error| Error::FetchTransport {
            url: url.to_string(),
            cause: e.to_string(),
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .header(ACCEPT, BROWSER_ACCEPT)
            .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        Ok(FetchedPage {
            url: url.to_string(),
            status,
            body,
        })
    }

    /// GET `url` and require a 200 response.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let page = self.get(url).await?;
        if !page.is_ok() {
            return Err(Error::FetchStatus {
                url: page.url,
                status: page.status,
            });
        }
        Ok(page.body)
    }

    /// Fetch a site's homepage. Blocked domains are rejected before any
    /// request is made.
    pub async fn fetch_homepage(&self, url: &str) -> Result<String> {
        domain::check_allowed(url)?;
        let html = self.fetch_html(url).await?;
        tracing::debug!("Fetched {} ({} bytes)", url, html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    /// Compares the raw header value; the stock matcher splits on commas.
    fn raw_header(name: &'static str, value: &'static str) -> impl Fn(&Request) -> bool {
        move |request: &Request| {
            request
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v == value)
                .unwrap_or(false)
        }
    }

    fn fetcher() -> PageFetcher {
        PageFetcher::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_homepage_sends_browser_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(raw_header("user-agent", BROWSER_USER_AGENT))
            .and(raw_header("accept", BROWSER_ACCEPT))
            .and(raw_header("accept-language", BROWSER_ACCEPT_LANGUAGE))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>home</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let html = fetcher().fetch_homepage(&server.uri()).await.unwrap();
        assert_eq!(html, "<html>home</html>");
    }

    #[tokio::test]
    async fn test_fetch_homepage_non_200_names_url_and_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetcher().fetch_homepage(&server.uri()).await.unwrap_err();
        match err {
            Error::FetchStatus { url, status } => {
                assert_eq!(url, server.uri());
                assert_eq!(status, 503);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_homepage_transport_error() {
        // Nothing listens on port 9 of the loopback interface.
        let err = fetcher().fetch_homepage("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, Error::FetchTransport { .. }));
    }

    #[tokio::test]
    async fn test_fetch_homepage_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch_homepage(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::FetchTransport { url, .. } if url == server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_homepage_rejects_blocked_domain() {
        let err = fetcher()
            .fetch_homepage("https://www.instagram.com/")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BlockedDomain(d) if d == "instagram.com"));
    }

    #[tokio::test]
    async fn test_get_rejects_malformed_url() {
        let err = fetcher().get("not a url").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }
}
