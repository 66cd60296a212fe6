use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use nt_core::{Error, InferenceModel, Result};
use serde::de::DeserializeOwned;

use crate::usage::Usage;

/// Re-prompts allowed when a reply does not parse.
pub const DEFAULT_RETRIES: usize = 3;

/// A system prompt bound to a model, producing replies of type `T`.
pub struct Agent<T> {
    model: Arc<dyn InferenceModel>,
    system_prompt: String,
    retries: usize,
    _output: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.model.name())
            .field("output", &std::any::type_name::<T>())
            .field("retries", &self.retries)
            .finish()
    }
}

impl<T: DeserializeOwned> Agent<T> {
    pub fn new(model: Arc<dyn InferenceModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
            retries: DEFAULT_RETRIES,
            _output: PhantomData,
        }
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Sends `prompt` and parses the reply. Unparseable replies are retried
    /// with the parse error appended; model failures are returned at once.
    pub async fn run(&self, prompt: &str, usage: &Usage) -> Result<T> {
        let mut last_error = String::new();

        for attempt in 0..=self.retries {
            usage.record_request()?;
            let message = if attempt == 0 {
                prompt.to_string()
            } else {
                format!(
                    "{}\n\nYour previous reply could not be parsed: {}. Reply with valid JSON only.",
                    prompt, last_error
                )
            };

            let reply = self.model.complete(&self.system_prompt, &message).await?;
            match parse_reply::<T>(&reply) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!(
                        "{} reply did not parse (attempt {}/{}): {}",
                        self.model.name(),
                        attempt + 1,
                        self.retries + 1,
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(Error::MalformedOutput(last_error))
    }
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

/// Extracts the JSON value from a model reply, tolerating code fences and
/// prose around it.
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> std::result::Result<T, String> {
    let text = strip_code_fence(reply);
    let first_error = match serde_json::from_str::<T>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    let start = text.find(|c| c == '[' || c == '{');
    let end = text.rfind(|c| c == ']' || c == '}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<T>(&text[start..=end]) {
                return Ok(value);
            }
        }
    }
    Err(first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScriptedModel;
    use crate::usage::UsageLimits;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        answer: String,
    }

    #[test]
    fn test_parse_reply_variants() {
        let plain: Reply = parse_reply(r#"{"answer": "yes"}"#).unwrap();
        assert_eq!(plain.answer, "yes");

        let fenced: Reply = parse_reply("```json\n{\"answer\": \"fenced\"}\n```").unwrap();
        assert_eq!(fenced.answer, "fenced");

        let chatty: Vec<u32> = parse_reply("Here you go: [1, 2, 3]. Anything else?").unwrap();
        assert_eq!(chatty, vec![1, 2, 3]);

        assert!(parse_reply::<Reply>("no json here").is_err());
    }

    #[tokio::test]
    async fn test_run_retries_malformed_output() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply("sorry, I cannot")
                .with_reply(r#"{"answer": "second time"}"#),
        );
        let agent: Agent<Reply> = Agent::new(model.clone(), "system");
        let usage = Usage::default();

        let reply = agent.run("question", &usage).await.unwrap();
        assert_eq!(reply.answer, "second time");
        assert_eq!(usage.requests(), 2);
        assert!(model.prompts()[1].contains("could not be parsed"));
    }

    #[tokio::test]
    async fn test_run_gives_up_after_retries() {
        let model = Arc::new(
            ScriptedModel::new()
                .with_reply("nope")
                .with_reply("nope")
                .with_reply("nope"),
        );
        let agent: Agent<Reply> = Agent::new(model, "system").with_retries(2);
        let err = agent.run("question", &Usage::default()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn test_run_does_not_retry_model_errors() {
        let model = Arc::new(ScriptedModel::new().with_error("connection reset").with_reply("{}"));
        let agent: Agent<Reply> = Agent::new(model.clone(), "system");
        let err = agent.run("question", &Usage::default()).await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert_eq!(model.remaining(), 1);
    }

    #[tokio::test]
    async fn test_run_respects_usage_limit() {
        let model = Arc::new(ScriptedModel::new().with_reply("bad").with_reply("bad"));
        let agent: Agent<Reply> = Agent::new(model, "system");
        let usage = Usage::new(UsageLimits { request_limit: 1 });
        let err = agent.run("question", &usage).await.unwrap_err();
        assert!(matches!(err, Error::UsageLimitExceeded { limit: 1 }));
    }
}
