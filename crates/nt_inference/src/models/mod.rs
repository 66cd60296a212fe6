use std::sync::Arc;

use nt_core::Result;

use crate::Config;

pub mod chat;
pub mod scripted;

pub use chat::{ChatModel, Provider};
pub use nt_core::InferenceModel;
pub use scripted::ScriptedModel;

/// Builds the configured model. Defaults to Groq.
pub async fn create_model(config: Option<Config>) -> Result<Arc<dyn InferenceModel>> {
    let config = config.unwrap_or_default();
    let provider = Provider::from_name(config.model_name.as_deref().unwrap_or("groq"))?;

    let mut model = ChatModel::new(provider, config.api_key)?;
    if let Some(url) = config.model_url {
        model = model.with_base_url(url);
    }
    if let Some(id) = config.model_id {
        model = model.with_model(id);
    }

    tracing::debug!("Using {} model {}", provider.display_name(), model.model());
    Ok(Arc::new(model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_model_defaults_to_groq() {
        let config = Config {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        };
        let model = create_model(Some(config)).await.unwrap();
        assert_eq!(model.name(), "Groq");
    }

    #[tokio::test]
    async fn test_create_model_ollama_needs_no_key() {
        let config = Config {
            model_name: Some("ollama".to_string()),
            model_url: Some("http://localhost:11434/v1".to_string()),
            ..Default::default()
        };
        let model = create_model(Some(config)).await.unwrap();
        assert_eq!(model.name(), "Ollama");
    }

    #[tokio::test]
    async fn test_create_model_rejects_unknown_provider() {
        let config = Config {
            model_name: Some("unknown".to_string()),
            ..Default::default()
        };
        assert!(create_model(Some(config)).await.is_err());
    }
}
