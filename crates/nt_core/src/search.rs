use async_trait::async_trait;
use std::fmt;

use crate::types::SearchHit;
use crate::Result;

/// A keyed third-party web search restricted to one site.
#[async_trait]
pub trait WebSearch: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Search `query` within `domain`. Implementations return only hits whose
    /// link belongs to `domain`.
    async fn search_site(&self, query: &str, domain: &str) -> Result<Vec<SearchHit>>;
}
