use std::sync::Arc;

use nt_core::{InferenceModel, Result};

use crate::agent::Agent;
use crate::usage::{Usage, UsageLimits};

/// Characters of homepage HTML handed to the model.
pub const MAX_HTML_CHARS: usize = 30_000;

const LINK_ANALYSIS_SYSTEM: &str = "You are a web structure analyzer that identifies important URLs \
on a website. Always return a valid JSON array of strings, where each string is a complete URL. \
Focus on finding search pages, content sections, and article links.";

/// Picks the links of a homepage that are worth crawling for content.
#[derive(Debug)]
pub struct LinkAnalyzer {
    agent: Agent<Vec<String>>,
    limits: UsageLimits,
}

impl LinkAnalyzer {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            agent: Agent::new(model, LINK_ANALYSIS_SYSTEM),
            limits: UsageLimits::default(),
        }
    }

    pub async fn important_links(&self, domain: &str, html: &str) -> Result<Vec<String>> {
        let usage = Usage::new(self.limits);
        let html: String = html.chars().take(MAX_HTML_CHARS).collect();
        let prompt = format!(
            "Analyze this HTML from {} and identify important links for content discovery:\n\n{}",
            domain, html
        );

        let links: Vec<String> = self
            .agent
            .run(&prompt, &usage)
            .await?
            .into_iter()
            .map(|link| link.trim().to_string())
            .filter(|link| !link.is_empty())
            .collect();
        tracing::info!("Found {} important links on {}", links.len(), domain);
        Ok(links)
    }
}
