//! Marketing analysis of scraped page text.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::ai::{CompletionProvider, CompletionRequest};
use crate::core::{AnalysisConfig, CampaignError, CampaignResult};

/// Marker that flags an analysis as failed wherever it appears.
pub const ERROR_SENTINEL: &str = "Error";

const ANALYSIS_TEMPLATE: &str = r"You are an expert marketing analyst. Your task is to analyze the following text from a product announcement or blog post and extract key information for a social media campaign.

Please extract the following:
1.  **Core Theme/Message**: What is the single most important message of this text?
2.  **Key Value Propositions**: List 3-5 unique benefits or features highlighted. What problems do they solve for the user?
3.  **Target Audience**: Who is this announcement for? (e.g., developers, marketers, general consumers).
4.  **Key Statistics or Data Points**: Pull out any numbers, percentages, or concrete data mentioned.
5.  **Tone of Voice**: Describe the tone of the original text (e.g., formal, casual, technical, enthusiastic).

Provide the output in a clear, structured format.

---
TEXT TO ANALYZE:
{text}
---

ANALYSIS:
";

/// True when `analysis` must not be fed to generation: it is blank or
/// carries the error marker anywhere in its text.
pub fn is_unusable_analysis(analysis: &str) -> bool {
    analysis.trim().is_empty() || analysis.contains(ERROR_SENTINEL)
}

/// Keep the leading `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render the analysis prompt for already-truncated text.
pub fn analysis_prompt(text: &str) -> String {
    ANALYSIS_TEMPLATE.replace("{text}", text)
}

/// Turns page text into a free-form five-part marketing analysis.
pub struct Analyzer {
    provider: Arc<dyn CompletionProvider>,
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer backed by `provider`.
    pub fn new(provider: Arc<dyn CompletionProvider>, config: AnalysisConfig) -> Self {
        Self { provider, config }
    }

    /// Analyze `text`.
    ///
    /// Empty input fails without a completion call.
    pub async fn analyze(&self, text: &str) -> CampaignResult<String> {
        if text.trim().is_empty() {
            warn!("Analysis skipped: input text is empty");
            return Err(CampaignError::Analysis("input text is empty".to_string()));
        }

        let truncated = truncate_chars(text, self.config.max_input_chars);
        info!(
            provider = self.provider.name(),
            chars = truncated.chars().count(),
            truncated = truncated.len() < text.len(),
            "Starting text analysis"
        );

        let request = CompletionRequest::new(analysis_prompt(truncated))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let analysis = self.provider.complete(&request).await.map_err(|e| {
            error!(error = %e, "An error occurred during text analysis");
            CampaignError::Analysis(format!("could not analyze the text: {e}"))
        })?;

        if is_unusable_analysis(&analysis) {
            warn!("Completion returned an unusable analysis");
            return Err(CampaignError::Analysis("completion returned no usable analysis".into()));
        }

        info!(chars = analysis.len(), "Completed text analysis");
        Ok(analysis.trim().to_string())
    }
}
