//! Workflow orchestration: fetch → analyze → generate → approve → store.
//!
//! The [`Session`] carries everything a run produces. Each transition
//! takes the session by value and hands back the advanced session, so no
//! stage reads state it was not given.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::analyzer::Analyzer;
use super::generator::CampaignGenerator;
use crate::ai::CompletionProvider;
use crate::core::{CampaignError, CampaignPost, CampaignResult, Config};
use crate::fetch::{normalize_url, PageFetcher, WebFetcher};
use crate::scheduler::{CommitReport, ScheduleStore};

/// Position of a session in the workflow.
///
/// A failed transition returns the stage error instead of a session; that
/// error is the aborted terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Fetched,
    Analyzed,
    Generated,
    Scheduled,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetched => "fetched",
            Self::Analyzed => "analyzed",
            Self::Generated => "generated",
            Self::Scheduled => "scheduled",
        };
        write!(f, "{name}")
    }
}

/// State of one operator-initiated run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Source URL, scheme included
    pub url: String,
    pub state: WorkflowState,
    /// Extracted page text (not persisted)
    #[serde(skip)]
    pub page_text: Option<String>,
    pub analysis: Option<String>,
    /// Candidate batch open for operator edits
    pub posts: Vec<CampaignPost>,
}

impl Session {
    /// Start a fresh session for `url`.
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_url(url),
            state: WorkflowState::Idle,
            page_text: None,
            analysis: None,
            posts: Vec::new(),
        }
    }

    /// Approved posts, in array order.
    pub fn approved_posts(&self) -> Vec<CampaignPost> {
        self.posts.iter().filter(|p| p.approved).cloned().collect()
    }

    fn expect_state(&self, expected: WorkflowState) -> CampaignResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CampaignError::InvalidTransition(format!(
                "session is {}, expected {expected}",
                self.state
            )))
        }
    }
}

/// Sequences the pipeline stages. The only component that knows them all.
pub struct Workflow {
    fetcher: Box<dyn PageFetcher>,
    analyzer: Analyzer,
    generator: CampaignGenerator,
}

impl Workflow {
    /// Assemble a workflow from explicit stages.
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        provider: Arc<dyn CompletionProvider>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            analyzer: Analyzer::new(provider.clone(), config.analysis.clone()),
            generator: CampaignGenerator::new(provider, config.generation.clone()),
        }
    }

    /// Workflow fetching over HTTP.
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn CompletionProvider>,
    ) -> CampaignResult<Self> {
        let fetcher = WebFetcher::new(&config.fetch)?;
        Ok(Self::new(Box::new(fetcher), provider, config))
    }

    /// `idle → fetched`
    pub async fn fetch(&self, mut session: Session) -> CampaignResult<Session> {
        session.expect_state(WorkflowState::Idle)?;
        info!(url = %session.url, "Step 1: Scraping website content");

        let text = self.fetcher.fetch_text(&session.url).await?;
        session.page_text = Some(text);
        session.state = WorkflowState::Fetched;
        Ok(session)
    }

    /// `fetched → analyzed`
    pub async fn analyze(&self, mut session: Session) -> CampaignResult<Session> {
        session.expect_state(WorkflowState::Fetched)?;
        info!("Step 2: Analyzing content");

        let text = session.page_text.take().unwrap_or_default();
        let analysis = self.analyzer.analyze(&text).await?;
        session.analysis = Some(analysis);
        session.state = WorkflowState::Analyzed;
        Ok(session)
    }

    /// `analyzed → generated`
    pub async fn generate(&self, mut session: Session) -> CampaignResult<Session> {
        session.expect_state(WorkflowState::Analyzed)?;
        info!("Step 3: Generating social media campaign");

        let analysis = session.analysis.as_deref().unwrap_or_default();
        let posts = self.generator.generate(analysis, &session.url).await?;
        session.posts = posts;
        session.state = WorkflowState::Generated;
        Ok(session)
    }

    /// Run every automatic transition for `url`, stopping at the first failure.
    pub async fn run(&self, url: &str) -> CampaignResult<Session> {
        let session = Session::new(url);
        let session = self.fetch(session).await?;
        let session = self.analyze(session).await?;
        self.generate(session).await
    }
}

/// Schedule the approved posts of a reviewed batch.
///
/// Works from the post list alone, so a batch edited outside the process
/// commits the same way as an interactive one.
pub async fn commit_posts(
    store: &ScheduleStore,
    posts: &[CampaignPost],
) -> CampaignResult<CommitReport> {
    let approved: Vec<CampaignPost> = posts.iter().filter(|p| p.approved).cloned().collect();
    if approved.is_empty() {
        warn!("No posts were approved for scheduling");
        return Ok(CommitReport::default());
    }

    store.initialize().await?;
    store.schedule_batch(&approved).await
}

/// `generated → scheduled`: commit a session after the approval gate.
pub async fn commit(
    store: &ScheduleStore,
    mut session: Session,
) -> CampaignResult<(Session, CommitReport)> {
    session.expect_state(WorkflowState::Generated)?;
    let report = commit_posts(store, &session.posts).await?;
    session.state = WorkflowState::Scheduled;
    Ok((session, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{ScriptedProvider, StaticPage};
    use tempfile::TempDir;

    const POSTS: &str = r#"```json
    [
        {"platform": "Twitter", "content": "New release https://ex.com", "scheduled_date": "2020-01-01"},
        {"platform": "LinkedIn", "content": "What it means https://ex.com", "scheduled_date": "2020-01-01"}
    ]
    ```"#;

    fn workflow(page: Option<&str>, provider: &Arc<ScriptedProvider>) -> Workflow {
        Workflow::new(
            Box::new(StaticPage(page.map(str::to_string))),
            provider.clone(),
            &Config::default(),
        )
    }

    #[tokio::test]
    async fn test_run_reaches_generated() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("Core theme: faster builds".into()),
            Ok(POSTS.into()),
        ]));
        let session = workflow(Some("Launch text"), &provider).run("ex.com").await.unwrap();

        assert_eq!(session.state, WorkflowState::Generated);
        assert_eq!(session.url, "https://ex.com");
        assert_eq!(session.analysis.as_deref(), Some("Core theme: faster builds"));
        assert_eq!(session.posts.len(), 2);
        assert!(session.page_text.is_none());
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_aborts_before_completion() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let err = workflow(None, &provider).run("ex.com").await.unwrap_err();

        assert_eq!(err.stage(), "scrape failed");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_analysis_failure_skips_generation() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err("rate limited".into())]));
        let err = workflow(Some("Launch text"), &provider).run("ex.com").await.unwrap_err();

        assert_eq!(err.stage(), "analysis failed");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure() {
        let provider =
            Arc::new(ScriptedProvider::new(vec![Ok("Core theme".into()), Ok("not json".into())]));
        let err = workflow(Some("Launch text"), &provider).run("ex.com").await.unwrap_err();
        assert_eq!(err.stage(), "generation failed");
    }

    #[tokio::test]
    async fn test_transition_out_of_order_rejected() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let result = workflow(Some("text"), &provider).analyze(Session::new("ex.com")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_commit_stores_only_approved_posts() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("theme".into()), Ok(POSTS.into())]));
        let mut session = workflow(Some("Launch text"), &provider).run("ex.com").await.unwrap();
        session.posts[0].approved = false;
        session.posts[1].content = "Edited https://ex.com".to_string();

        let dir = TempDir::new().unwrap();
        let store = ScheduleStore::new(dir.path().join("campaign.db"));
        let (session, report) = commit(&store, session).await.unwrap();

        assert_eq!(session.state, WorkflowState::Scheduled);
        assert_eq!(report.scheduled.len(), 1);
        let stored = store.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "Edited https://ex.com");
    }

    #[tokio::test]
    async fn test_commit_nothing_approved() {
        let dir = TempDir::new().unwrap();
        let store = ScheduleStore::new(dir.path().join("campaign.db"));
        let report = commit_posts(&store, &[]).await.unwrap();
        assert_eq!(report.submitted(), 0);
    }
}
