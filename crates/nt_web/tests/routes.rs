use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use nt_core::WebSearch;
use nt_inference::models::ScriptedModel;
use nt_scrappers::{PageFetcher, SerperSearch};
use nt_web::{create_app, AppState, Service, ServiceConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REFINED: &str = r#"{"keywords": ["rates"]}"#;

async fn app(model: Arc<ScriptedModel>, web_search: Option<Arc<dyn WebSearch>>) -> Router {
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let state = AppState::with_fetcher(fetcher, model, web_search, &ServiceConfig::default());
    create_app(state, Service::All).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[tokio::test]
async fn test_root_status() {
    let (status, body) = get(app(Arc::new(ScriptedModel::new()), None).await, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "API is running");
}

#[tokio::test]
async fn test_search_blocked_domain_makes_no_calls() {
    let model = Arc::new(ScriptedModel::new());
    let (status, body) = get(
        app(model.clone(), None).await,
        "/search?url=https://www.facebook.com/some-page&query=anything",
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({
            "error": "Scraping facebook.com is not supported due to authentication requirements",
            "articles": [],
            "count": 0
        })
    );
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_search_rejects_unknown_method() {
    let (status, body) = get(
        app(Arc::new(ScriptedModel::new()), None).await,
        "/search?url=https://www.example.com&query=rates&method=both",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("both"));
}

#[tokio::test]
async fn test_search_requires_query() {
    let (status, body) = get(app(Arc::new(ScriptedModel::new()), None).await, "/search?url=https://www.example.com").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: query");
}

#[tokio::test]
async fn test_direct_scrape_failure_is_an_error() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&site)
        .await;

    let model = Arc::new(ScriptedModel::new());
    let uri = format!("/search?url={}&query=rates&method=direct_scrape", encode(&site.uri()));
    let (status, body) = get(app(model.clone(), None).await, &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert!(body.get("articles").is_none());
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_combined_succeeds_from_web_search_alone() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&site)
        .await;
    let article_url = format!("{}/business/rates", site.uri());

    let serper = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                {"title": "Rates rise", "link": article_url, "snippet": "The central bank..."},
                {"title": "Elsewhere", "link": "https://other.org/rates", "snippet": ""}
            ]
        })))
        .mount(&serper)
        .await;
    let search: Arc<dyn WebSearch> = Arc::new(
        SerperSearch::new(reqwest::Client::new(), "test-key").with_endpoint(format!("{}/search", serper.uri())),
    );

    let model = Arc::new(
        ScriptedModel::new()
            .with_reply(REFINED)
            .with_reply(json!([{"title": "Rates rise", "url": article_url}]).to_string()),
    );
    let uri = format!("/search?url={}&query=rates", encode(&site.uri()));
    let (status, body) = get(app(model.clone(), Some(search)).await, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["domain"], "127.0.0.1");
    assert_eq!(body["articles"][0]["url"], article_url.as_str());
    assert_eq!(body["articles"][0]["source_domain"], "127.0.0.1");
    assert!(!model.prompts()[1].contains("other.org"));
}

#[tokio::test]
async fn test_search_with_no_matching_articles_reports_reason() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body><h1>Sports</h1></body></html>"))
        .mount(&site)
        .await;

    let model = Arc::new(
        ScriptedModel::new()
            .with_reply(REFINED)
            .with_reply(r#"[{"title": "Off site", "url": "https://elsewhere.org/rates"}]"#),
    );
    let uri = format!("/search?url={}&query=rates&method=direct_scrape", encode(&site.uri()));
    let (status, body) = get(app(model, None).await, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"message": "No valid articles found from 127.0.0.1", "articles": [], "count": 0})
    );
}

#[tokio::test]
async fn test_explore_blocked_domain() {
    let (status, _) = get(
        app(Arc::new(ScriptedModel::new()), None).await,
        "/explore?url=https://www.linkedin.com/feed",
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_explore_with_link_analysis() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><title>Daily</title></head><body><a href="/world">World</a></body></html>"#,
        ))
        .mount(&site)
        .await;
    let world = format!("{}/world", site.uri());
    let model = Arc::new(ScriptedModel::new().with_reply(json!([world]).to_string()));

    let uri = format!("/explore?url={}&analyze=true", encode(&site.uri()));
    let (status, body) = get(app(model, None).await, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Daily");
    assert_eq!(body["link_count"], 1);
    assert_eq!(body["important_links"], json!([world]));
}

#[tokio::test]
async fn test_scrape_failure() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;

    let uri = format!("/scrape?url={}", encode(&format!("{}/missing", site.uri())));
    let (status, body) = get(app(Arc::new(ScriptedModel::new()), None).await, &uri).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn test_sources_post_and_malformed_reply() {
    let model = Arc::new(
        ScriptedModel::new()
            .with_reply(r#"{"sources": [{"name": "Example", "description": "News", "url": "https://www.example.com"}]}"#)
            .with_reply("no")
            .with_reply("still no")
            .with_reply("nope")
            .with_reply("never"),
    );
    let app = app(model, None).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/sources")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"question": "who covers interest rates?"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_slice(&to_bytes(response.into_body(), usize::MAX).await.unwrap()).unwrap();
    assert_eq!(body["answer"]["sources"][0]["url"], "https://www.example.com");

    let (status, body) = get(app, "/sources?question=anything").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"answer": {"sources": []}}));
}

#[tokio::test]
async fn test_sources_model_failure() {
    let model = Arc::new(ScriptedModel::new().with_error("401 invalid api key"));
    let (status, body) = get(app(model, None).await, "/sources?question=anything").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to generate sources. Please try again."}));
}

#[tokio::test]
async fn test_single_service_router() {
    let fetcher = PageFetcher::new(Duration::from_secs(5)).unwrap();
    let state = AppState::with_fetcher(fetcher, Arc::new(ScriptedModel::new()), None, &ServiceConfig::default());
    let app = create_app(state, Service::Sources).await;

    let request = Request::builder().uri("/search").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
