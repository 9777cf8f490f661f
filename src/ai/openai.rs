//! OpenAI API integration.
//!
//! Implements the CompletionProvider trait for OpenAI GPT models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{credential, CompletionProvider, CompletionRequest};
use crate::core::CampaignResult;

/// OpenAI API provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    ///
    /// Reads API key from OPENAI_API_KEY environment variable.
    pub fn new() -> CampaignResult<Self> {
        let api_key = credential("OPENAI_API_KEY")?;

        Ok(Self {
            client: Client::new(),
            api_key,
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        })
    }

    /// Create with a specific model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create with a custom base URL (for Azure OpenAI or compatible APIs).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        let body = OpenAIRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage { role: "user".to_string(), content: request.prompt.clone() }],
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        let response: OpenAIResponse = response.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
