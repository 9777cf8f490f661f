//! Content pipeline: page text → analysis → dated candidate posts.
//!
//! ## Stages
//!
//! - `Analyzer` - five-part marketing analysis of the page text
//! - `CampaignGenerator` - JSON post batch, cleaned and re-dated
//! - `Workflow` - sequences fetch, analysis and generation over a `Session`

mod analyzer;
mod generator;
mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{analysis_prompt, is_unusable_analysis, truncate_chars, Analyzer, ERROR_SENTINEL};
pub use generator::{
    assign_schedule, generation_prompt, parse_posts, strip_code_fence, CampaignGenerator,
};
pub use workflow::{commit, commit_posts, Session, Workflow, WorkflowState};
