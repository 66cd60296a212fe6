use async_trait::async_trait;
use std::fmt;

use crate::Result;

/// A text-understanding service: takes a system prompt and a user prompt and
/// returns the model's raw reply.
#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    /// Human readable name of the backing model
    fn name(&self) -> &str;

    /// Run one completion. Each call counts against the caller's budget.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}
