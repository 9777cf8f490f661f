//! Post types: candidates produced by the generator and rows owned by the store.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{CampaignError, CampaignResult};

/// Date format used for every `scheduled_date` value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default status assigned to every stored post.
pub const STATUS_SCHEDULED: &str = "scheduled";

/// Social network a post targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    /// Twitter / X
    Twitter,
    /// LinkedIn
    LinkedIn,
}

impl Platform {
    /// Canonical name, as stored and as sent to the model.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitter" | "x" | "twitter (x)" | "x (twitter)" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::LinkedIn),
            other => Err(format!("unknown platform '{other}'")),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.name().to_string()
    }
}

/// A candidate post awaiting operator approval.
///
/// `scheduled_date` is kept as text so an operator edit that breaks the
/// format survives until the store rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignPost {
    /// Target network
    pub platform: Platform,

    /// Post body; should embed the source URL
    pub content: String,

    /// Publication date, `YYYY-MM-DD`
    pub scheduled_date: String,

    /// Whether the operator approved this post
    #[serde(default = "default_approved")]
    pub approved: bool,
}

fn default_approved() -> bool {
    true
}

impl CampaignPost {
    /// Create an approved post for the given date.
    pub fn new(platform: Platform, content: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            platform,
            content: content.into(),
            scheduled_date: date.format(DATE_FORMAT).to_string(),
            approved: true,
        }
    }
}

/// A post persisted by the schedule store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPost {
    pub id: i64,
    pub platform: Platform,
    pub content: String,
    pub scheduled_date: String,
    pub status: String,
    pub created_at: String,
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// Values chrono would accept loosely (missing zero padding, trailing
/// text) are rejected by re-formatting and comparing.
pub fn parse_schedule_date(value: &str) -> CampaignResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| CampaignError::InvalidDate(value.to_string()))?;

    if date.format(DATE_FORMAT).to_string() != value {
        return Err(CampaignError::InvalidDate(value.to_string()));
    }

    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing() {
        assert_eq!("Twitter".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("twitter (X)".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!("X".parse::<Platform>().unwrap(), Platform::Twitter);
        assert_eq!(" LinkedIn ".parse::<Platform>().unwrap(), Platform::LinkedIn);
        assert!("Mastodon".parse::<Platform>().is_err());
    }

    #[test]
    fn test_post_deserializes_with_default_approval() {
        let json = r#"{"platform": "LinkedIn", "content": "Hello", "scheduled_date": "2025-01-02"}"#;
        let post: CampaignPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.platform, Platform::LinkedIn);
        assert!(post.approved);
    }

    #[test]
    fn test_post_serializes_platform_name() {
        let date = NaiveDate::from_ymd_opt(2025, 10, 26).unwrap();
        let post = CampaignPost::new(Platform::Twitter, "Hi", date);
        let json = serde_json::to_string(&post).unwrap();
        assert!(json.contains(r#""platform":"Twitter""#));
        assert!(json.contains(r#""scheduled_date":"2025-10-26""#));
    }

    #[test]
    fn test_parse_schedule_date() {
        assert!(parse_schedule_date("2025-10-26").is_ok());
        assert!(parse_schedule_date("26-10-2025").is_err());
        assert!(parse_schedule_date("2025-1-5").is_err());
        assert!(parse_schedule_date("2025-02-30").is_err());
        assert!(parse_schedule_date("").is_err());
    }
}
