use std::sync::Arc;

use nt_core::{InferenceModel, Result, WebSearch};
use nt_inference::{ArticleExtractor, LinkAnalyzer, SourceFinder};
use nt_scrappers::fetch::DEFAULT_FETCH_TIMEOUT;
use nt_scrappers::{ContentAcquirer, PageFetcher};

use crate::config::ServiceConfig;
use crate::coordinator::Coordinator;

/// Shared by every request. Holds collaborators and a pooled client only,
/// never request data.
pub struct AppState {
    pub fetcher: PageFetcher,
    pub acquirer: ContentAcquirer,
    pub extractor: ArticleExtractor,
    pub link_analyzer: LinkAnalyzer,
    pub source_finder: SourceFinder,
    pub coordinator: Coordinator,
}

impl AppState {
    pub fn new(
        inference_model: Arc<dyn InferenceModel>,
        web_search: Option<Arc<dyn WebSearch>>,
        config: &ServiceConfig,
    ) -> Result<Self> {
        let fetcher = PageFetcher::new(DEFAULT_FETCH_TIMEOUT)?;
        Ok(Self::with_fetcher(fetcher, inference_model, web_search, config))
    }

    pub fn with_fetcher(
        fetcher: PageFetcher,
        inference_model: Arc<dyn InferenceModel>,
        web_search: Option<Arc<dyn WebSearch>>,
        config: &ServiceConfig,
    ) -> Self {
        if web_search.is_none() {
            tracing::warn!("No web search configured, serper searches will find nothing");
        }
        Self {
            acquirer: ContentAcquirer::new(fetcher.clone(), web_search),
            extractor: ArticleExtractor::new(inference_model.clone()),
            link_analyzer: LinkAnalyzer::new(inference_model.clone()),
            source_finder: SourceFinder::from_prompt_file(inference_model, &config.sources_prompt),
            coordinator: Coordinator::new(fetcher.client().clone(), config),
            fetcher,
        }
    }
}
