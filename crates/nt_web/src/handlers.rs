use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use nt_core::{domain, Error, Extraction, SearchMethod};
use nt_scrappers::{explore, text};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::coordinator::Coordinated;
use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub url: Option<String>,
    pub query: Option<String>,
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    pub url: Option<String>,
    #[serde(default)]
    pub analyze: bool,
}

#[derive(Debug, Deserialize)]
pub struct UrlParams {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionParams {
    pub question: Option<String>,
}

fn required(value: Option<String>, name: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::missing(name))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "API is running",
        "message": "Use /search endpoint to search websites",
        "example": "/search?url=https://www.example.com&query=your search query",
    }))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Value>> {
    let url = required(params.url, "url")?;
    let query = required(params.query, "query")?;
    let method: SearchMethod = params.method.as_deref().unwrap_or_default().parse()?;
    let domain = domain::check_allowed(&url)?;
    tracing::info!("Searching {} for '{}' ({})", domain, query, method);

    let acquired = state
        .acquirer
        .acquire(&url, &query, method)
        .await
        .map_err(|e| match e {
            Error::NoContent(_) => ApiError::from(e),
            e if e.is_client_error() => ApiError::from(e),
            Error::Search(_) => ApiError::InternalError(format!("Failed to fetch web search results: {}", e)),
            e => ApiError::InternalError(format!("Failed to fetch content from {}: {}", url, e)),
        })?;

    let context = acquired.into_context(&url, &query, &domain);
    let extraction = state
        .extractor
        .extract(&context)
        .await
        .map_err(|e| ApiError::InternalError(format!("Error processing search results: {}", e)))?;

    Ok(Json(match extraction {
        Extraction::Articles(articles) => json!({
            "count": articles.len(),
            "articles": articles,
            "domain": domain,
        }),
        Extraction::NotFound(not_found) => json!({
            "message": not_found.reason,
            "articles": [],
            "count": 0,
        }),
    }))
}

pub async fn explore(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExploreParams>,
) -> ApiResult<Json<explore::SiteStructure>> {
    let url = required(params.url, "url")?;
    let (mut structure, html) = explore::explore(&state.fetcher, &url).await?;

    if params.analyze {
        match state.link_analyzer.important_links(&structure.domain, &html).await {
            Ok(links) => structure.important_links = Some(links),
            Err(e) => tracing::warn!("Link analysis failed for {}: {}", structure.domain, e),
        }
    }
    Ok(Json(structure))
}

pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UrlParams>,
) -> ApiResult<Json<text::PageText>> {
    let url = required(params.url, "url")?;
    let page = text::scrape_text(&state.fetcher, &url)
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?;
    Ok(Json(page))
}

async fn answer_sources(state: &AppState, question: Option<String>) -> ApiResult<Json<Value>> {
    let question = required(question, "question")?;
    let sources = state.source_finder.find(&question).await.map_err(|e| {
        tracing::error!("Source generation failed: {}", e);
        ApiError::InternalError("Failed to generate sources. Please try again.".to_string())
    })?;
    Ok(Json(json!({ "answer": sources })))
}

pub async fn sources_get(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuestionParams>,
) -> ApiResult<Json<Value>> {
    answer_sources(&state, params.question).await
}

pub async fn sources_post(
    State(state): State<Arc<AppState>>,
    Json(params): Json<QuestionParams>,
) -> ApiResult<Json<Value>> {
    answer_sources(&state, params.question).await
}

pub async fn coordinate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuestionParams>,
) -> ApiResult<Json<Coordinated>> {
    let question = required(params.question, "question")?;
    Ok(Json(state.coordinator.coordinate(&question).await?))
}
