//! Completion provider integration.
//!
//! Both language-model steps of the pipeline go through the
//! [`CompletionProvider`] trait: one prompt in, one block of text out.
//!
//! ## Providers
//!
//! - OpenAI chat completions (default)
//! - Claude messages API
//! - Ollama (local LLM, no credential)

mod claude;
mod ollama;
mod openai;

pub use claude::ClaudeProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{AiConfig, CampaignError, CampaignResult};

/// A single prompt-completion round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully rendered prompt
    pub prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with default sampling settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), temperature: 0.7, max_tokens: 1024 }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Trait for completion providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Submit the prompt and return the raw completion text.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Build the provider named in the configuration.
///
/// Fails when the provider is unknown or its credential is missing, so
/// callers can refuse to start before any pipeline stage runs.
pub fn provider_from_config(config: &AiConfig) -> CampaignResult<Arc<dyn CompletionProvider>> {
    match config.provider.to_lowercase().as_str() {
        "openai" => {
            let mut provider = OpenAIProvider::new()?;
            if let Some(ref model) = config.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(ref url) = config.base_url {
                provider = provider.with_base_url(url.clone());
            }
            Ok(Arc::new(provider))
        }
        "claude" | "anthropic" => {
            let mut provider = ClaudeProvider::new()?;
            if let Some(ref model) = config.model {
                provider = provider.with_model(model.clone());
            }
            Ok(Arc::new(provider))
        }
        "ollama" => {
            let model = config.model.clone().unwrap_or_else(|| config.ollama.model.clone());
            Ok(Arc::new(
                OllamaProvider::new().with_base_url(config.ollama.base_url.clone()).with_model(model),
            ))
        }
        other => Err(CampaignError::Config(format!(
            "unknown AI provider '{other}' (expected openai, claude or ollama)"
        ))),
    }
}

/// Read a credential from the environment.
pub(crate) fn credential(variable: &str) -> CampaignResult<String> {
    match std::env::var(variable) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CampaignError::MissingCredential { variable: variable.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("hi").with_temperature(0.8).with_max_tokens(4096);
        assert_eq!(request.prompt, "hi");
        assert!((request.temperature - 0.8).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 4096);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = AiConfig { provider: "mystery".to_string(), ..AiConfig::default() };
        let err = provider_from_config(&config).err().unwrap();
        assert!(matches!(err, CampaignError::Config(_)));
    }

    #[test]
    fn test_ollama_needs_no_credential() {
        let config = AiConfig { provider: "ollama".to_string(), ..AiConfig::default() };
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    #[serial(openai_env)]
    fn test_openai_requires_credential() {
        let original = std::env::var("OPENAI_API_KEY").ok();
        std::env::remove_var("OPENAI_API_KEY");

        let result = provider_from_config(&AiConfig::default());

        if let Some(val) = original {
            std::env::set_var("OPENAI_API_KEY", val);
        }

        match result {
            Err(CampaignError::MissingCredential { variable }) => {
                assert_eq!(variable, "OPENAI_API_KEY");
            }
            _ => panic!("expected missing credential"),
        }
    }
}
