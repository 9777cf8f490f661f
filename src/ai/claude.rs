//! Claude API integration.
//!
//! Implements the CompletionProvider trait for Claude.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{credential, CompletionProvider, CompletionRequest};
use crate::core::CampaignResult;

/// Claude API provider.
pub struct ClaudeProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    /// Create a new Claude provider.
    ///
    /// Reads API key from ANTHROPIC_API_KEY environment variable.
    pub fn new() -> CampaignResult<Self> {
        let api_key = credential("ANTHROPIC_API_KEY")?;

        Ok(Self { client: Client::new(), api_key, model: "claude-sonnet-4-20250514".to_string() })
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl CompletionProvider for ClaudeProvider {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let body = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message { role: "user".to_string(), content: request.prompt.clone() }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let response: ClaudeResponse = response.json().await?;

        let text: String =
            response.content.into_iter().filter_map(|block| block.text).collect::<Vec<_>>().join("");

        if text.is_empty() {
            anyhow::bail!("No response from Claude");
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        "claude"
    }
}

/// Claude API request structure.
#[derive(Debug, Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

/// Message in a Claude request.
#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Claude API response structure.
#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ContentBlock>,
}

/// Content block in a Claude response.
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}
