//! # Campaigner
//!
//! Turn a product announcement or blog post into a week of social posts.
//!
//! A run fetches the page, asks a language model for a marketing analysis,
//! asks again for a batch of Twitter and LinkedIn posts, lets the operator
//! approve and edit them, and stores the approved posts in a local SQLite
//! schedule.
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=...
//! campaigner run https://example.com/blog/launch
//! campaigner list
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod ai;
pub mod core;
pub mod fetch;
pub mod pipeline;
pub mod review;
pub mod scheduler;

// Re-export commonly used types
pub use ai::{provider_from_config, CompletionProvider, CompletionRequest};
pub use crate::core::{CampaignError, CampaignPost, CampaignResult, Config, Platform, ScheduledPost};
pub use fetch::{PageFetcher, WebFetcher};
pub use pipeline::{Session, Workflow, WorkflowState};
pub use scheduler::{CommitReport, ScheduleStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "campaigner";
