//! Error types shared by every pipeline stage.

use thiserror::Error;

/// Result type for campaign operations.
pub type CampaignResult<T> = Result<T, CampaignError>;

/// Errors that can occur while building or scheduling a campaign.
///
/// Each pipeline stage maps its internal failures onto one of these
/// variants so the orchestrator can tell *which* stage failed without
/// string matching.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// Page could not be fetched or contained no text.
    #[error("Scrape failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The analysis completion failed or produced nothing usable.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// The generation completion failed or returned malformed output.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A post date did not match `YYYY-MM-DD`.
    #[error("Invalid date format for scheduling: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Stored row could not be mapped back into a post.
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    /// No credential for the configured completion provider.
    #[error("{variable} environment variable not set")]
    MissingCredential { variable: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A workflow transition was attempted from the wrong state.
    #[error("Invalid workflow transition: {0}")]
    InvalidTransition(String),

    /// Database error.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CampaignError {
    /// Short operator-facing label for the stage that failed.
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "scrape failed",
            Self::Analysis(_) => "analysis failed",
            Self::Generation(_) => "generation failed",
            Self::InvalidDate(_) => "validation failed",
            Self::MissingCredential { .. } | Self::Config(_) => "configuration error",
            Self::InvalidTransition(_) => "workflow error",
            Self::CorruptRow { .. } | Self::Storage(_) | Self::Io(_) | Self::Json(_) => {
                "storage error"
            }
        }
    }
}
