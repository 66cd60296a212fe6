//! News source suggestions for a free-text question.

use std::path::Path;
use std::sync::Arc;

use nt_core::{Error, InferenceModel, NewsSource, NewsSourceList, Result};
use serde::Deserialize;

use crate::agent::Agent;
use crate::usage::{Usage, UsageLimits};

pub const DEFAULT_PROMPT_FILE: &str = "prompts/news_sources.md";

pub const DEFAULT_SOURCES_PROMPT: &str = "You are a research assistant that recommends news sources. \
Given a question, list websites that are likely to publish articles answering it. Reply with a \
JSON object {\"sources\": [{\"name\": \"...\", \"description\": \"...\", \"url\": \"https://...\"}]} \
using homepage URLs only.";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelSources {
    Wrapped(NewsSourceList),
    List(Vec<NewsSource>),
}

impl From<ModelSources> for NewsSourceList {
    fn from(reply: ModelSources) -> Self {
        match reply {
            ModelSources::Wrapped(list) => list,
            ModelSources::List(sources) => NewsSourceList { sources },
        }
    }
}

#[derive(Debug)]
pub struct SourceFinder {
    agent: Agent<ModelSources>,
    limits: UsageLimits,
}

impl SourceFinder {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self::with_prompt(model, DEFAULT_SOURCES_PROMPT)
    }

    pub fn with_prompt(model: Arc<dyn InferenceModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            agent: Agent::new(model, system_prompt),
            limits: UsageLimits::default(),
        }
    }

    /// Loads the system prompt from `path`, keeping the built-in prompt when
    /// the file cannot be read.
    pub fn from_prompt_file(model: Arc<dyn InferenceModel>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(prompt) if !prompt.trim().is_empty() => Self::with_prompt(model, prompt),
            Ok(_) => {
                tracing::warn!("Prompt file {} is empty, using built-in prompt", path.display());
                Self::new(model)
            }
            Err(e) => {
                tracing::warn!("Could not read prompt file {}: {}, using built-in prompt", path.display(), e);
                Self::new(model)
            }
        }
    }

    pub fn system_prompt(&self) -> &str {
        self.agent.system_prompt()
    }

    /// Asks the model for sources. A reply that never parses yields an
    /// empty list; model failures are returned.
    pub async fn find(&self, question: &str) -> Result<NewsSourceList> {
        let usage = Usage::new(self.limits);
        match self.agent.run(question, &usage).await {
            Ok(reply) => {
                let list = NewsSourceList::from(reply);
                tracing::info!("Generated {} news sources", list.sources.len());
                Ok(list)
            }
            Err(Error::MalformedOutput(e)) => {
                tracing::warn!("Sources reply could not be parsed, returning no sources: {}", e);
                Ok(NewsSourceList::default())
            }
            Err(e) => Err(e),
        }
    }
}
