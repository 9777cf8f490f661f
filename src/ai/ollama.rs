//! Ollama local LLM integration.
//!
//! Implements the CompletionProvider trait for Ollama (local LLM).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionRequest};

/// Ollama API provider for local LLM.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create a new Ollama provider with default settings.
    ///
    /// Uses localhost:11434 by default.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string()),
        }
    }

    /// Create with a specific base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let body = OllamaRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({}): {}", status, body);
        }

        let response: OllamaResponse = response.json().await?;
        Ok(response.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_builder() {
        let provider =
            OllamaProvider::new().with_base_url("http://gpu-box:11434").with_model("mistral");
        assert_eq!(provider.base_url, "http://gpu-box:11434");
        assert_eq!(provider.model, "mistral");
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_request_carries_options() {
        let body = OllamaRequest {
            model: "m".into(),
            prompt: "p".into(),
            stream: false,
            options: OllamaOptions { temperature: 0.5, num_predict: 64 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 64);
    }
}
