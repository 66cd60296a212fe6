use std::fmt;

pub mod agent;
pub mod extraction;
pub mod links;
pub mod models;
pub mod sources;
pub mod usage;

/// Model selection. Unset fields fall back to the provider defaults.
#[derive(Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub model_url: Option<String>,
    pub model_id: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("model_url", &self.model_url)
            .field("model_id", &self.model_id)
            .finish()
    }
}

pub mod prelude {
    pub use super::extraction::ArticleExtractor;
    pub use super::links::LinkAnalyzer;
    pub use super::models::create_model;
    pub use super::sources::SourceFinder;
    pub use super::Config;
    pub use nt_core::{Article, Error, Extraction, Result};
}

pub use extraction::{validate, ArticleExtractor};
pub use links::LinkAnalyzer;
pub use models::create_model;
pub use sources::SourceFinder;
pub use usage::{Usage, UsageLimits};
