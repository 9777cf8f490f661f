//! Campaign generation from an analysis.
//!
//! The model is asked for a JSON array of posts. Its response is cleaned
//! (code fence stripped), parsed, and then re-dated: the model's own
//! `scheduled_date` values are always discarded.

use std::sync::Arc;

use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::analyzer::is_unusable_analysis;
use crate::ai::{CompletionProvider, CompletionRequest};
use crate::core::{CampaignError, CampaignPost, CampaignResult, GenerationConfig, Platform};

/// First fenced block; an optional language tag, possibly space-separated,
/// follows the opening fence.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)(?:```|\z)").expect("valid fence regex")
});

const GENERATION_TEMPLATE: &str = r#"You are a world-class social media strategist. Based on the following analysis of a blog post/product announcement, create a {days}-day social media campaign.

**Objective**: Generate excitement and drive traffic to the source URL.
**Source URL**: {url}

**Instructions**:
1.  Create **5-7 posts for Twitter (X)**.
    - Tone: Catchy, concise, and engaging. Use relevant hashtags.
    - Format: Short sentences, questions, and strong calls to action. Each must include the {url}.
2.  Create **5-7 posts for LinkedIn**.
    - Tone: Professional, informative, and value-oriented.
    - Format: Well-structured posts that explain the "why" and encourage professional discussion. Each must include the {url}.
3.  Schedule the posts over {days} days, starting from tomorrow.
4.  Return the output as a single JSON array of objects. Each object must have the following keys: "platform" (either "Twitter" or "LinkedIn"), "content" (the post text), and "scheduled_date" (in "YYYY-MM-DD" format).

**DO NOT include any text or formatting outside of the JSON array.**

---
ANALYSIS:
{analysis}
---

JSON_OUTPUT:
"#;

/// Post as proposed by the model. `scheduled_date` and any other keys
/// are ignored.
#[derive(Debug, Deserialize)]
struct GeneratedPost {
    platform: Platform,
    content: String,
}

/// Render the generation prompt.
pub fn generation_prompt(analysis: &str, url: &str, campaign_days: u32) -> String {
    GENERATION_TEMPLATE
        .replace("{days}", &campaign_days.to_string())
        .replace("{url}", url)
        .replace("{analysis}", analysis)
}

/// Extract the body of the first fenced code block, if there is one.
pub fn strip_code_fence(raw: &str) -> &str {
    if !raw.contains("```") {
        return raw.trim();
    }
    CODE_FENCE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |body| body.as_str().trim())
}

/// Parse a (possibly fenced) completion into candidate posts, undated.
pub fn parse_posts(raw: &str) -> CampaignResult<Vec<(Platform, String)>> {
    let cleaned = strip_code_fence(raw);
    let posts: Vec<GeneratedPost> = serde_json::from_str(cleaned).map_err(|e| {
        error!(error = %e, "Failed to decode JSON from completion response");
        debug!(response = %raw, "Completion response was");
        CampaignError::Generation(format!("malformed JSON in completion response: {e}"))
    })?;

    Ok(posts.into_iter().map(|p| (p.platform, p.content)).collect())
}

/// Date posts in array order: post `i` lands on `start + (i mod days)`.
pub fn assign_schedule(
    posts: Vec<(Platform, String)>,
    start: NaiveDate,
    campaign_days: u32,
) -> Vec<CampaignPost> {
    let days = u64::from(campaign_days.max(1));
    posts
        .into_iter()
        .enumerate()
        .map(|(i, (platform, content))| {
            let offset = Days::new(i as u64 % days);
            let date = start.checked_add_days(offset).unwrap_or(start);
            CampaignPost::new(platform, content, date)
        })
        .collect()
}

/// Produces dated candidate posts from an analysis.
pub struct CampaignGenerator {
    provider: Arc<dyn CompletionProvider>,
    config: GenerationConfig,
}

impl CampaignGenerator {
    /// Create a generator backed by `provider`.
    pub fn new(provider: Arc<dyn CompletionProvider>, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    /// Generate a campaign scheduled from tomorrow.
    pub async fn generate(&self, analysis: &str, url: &str) -> CampaignResult<Vec<CampaignPost>> {
        self.generate_from(analysis, url, Local::now().date_naive()).await
    }

    /// Generate a campaign scheduled from the day after `today`.
    pub async fn generate_from(
        &self,
        analysis: &str,
        url: &str,
        today: NaiveDate,
    ) -> CampaignResult<Vec<CampaignPost>> {
        if is_unusable_analysis(analysis) {
            warn!("Content generation skipped due to invalid analysis");
            return Err(CampaignError::Generation("analysis is empty or failed".to_string()));
        }

        info!(provider = self.provider.name(), url = %url, "Starting social media content generation");

        let request = CompletionRequest::new(generation_prompt(analysis, url, self.config.campaign_days))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let raw = self.provider.complete(&request).await.map_err(|e| {
            error!(error = %e, "An error occurred during content generation");
            CampaignError::Generation(e.to_string())
        })?;

        let posts = parse_posts(&raw)?;
        if posts.is_empty() {
            warn!("Completion returned an empty post array");
            return Err(CampaignError::Generation("completion returned no posts".to_string()));
        }

        let start = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let posts = assign_schedule(posts, start, self.config.campaign_days);

        info!(count = posts.len(), "Generated social media posts");
        Ok(posts)
    }
}
