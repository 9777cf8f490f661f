//! Test doubles for pipeline stages.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ai::{CompletionProvider, CompletionRequest};
use crate::core::{CampaignError, CampaignResult};
use crate::fetch::PageFetcher;

/// Provider that replays canned responses in order and records prompts.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("no scripted response left")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Fetcher that returns a fixed page, or fails when given `None`.
pub struct StaticPage(pub Option<String>);

#[async_trait]
impl PageFetcher for StaticPage {
    async fn fetch_text(&self, url: &str) -> CampaignResult<String> {
        self.0.clone().ok_or_else(|| CampaignError::Fetch {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}
