//! Core types and functionality for Campaigner.
//!
//! This module contains the data structures shared by every stage:
//! posts, configuration and errors.

mod config;
mod error;
mod post;

pub use config::{
    AiConfig, AnalysisConfig, Config, FetchConfig, GeneralConfig, GenerationConfig, OllamaConfig,
    LOCAL_CONFIG_FILE,
};
pub use error::{CampaignError, CampaignResult};
pub use post::{
    parse_schedule_date, CampaignPost, Platform, ScheduledPost, DATE_FORMAT, STATUS_SCHEDULED,
};
