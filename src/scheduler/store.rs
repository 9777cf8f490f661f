//! SQLite-backed schedule store.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, FromRow};
use tracing::{debug, error, info};

use crate::core::{
    parse_schedule_date, CampaignError, CampaignPost, CampaignResult, Platform, ScheduledPost,
};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS scheduled_posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        platform TEXT NOT NULL,
        content TEXT NOT NULL,
        scheduled_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'scheduled',
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )
"#;

const INSERT_POST: &str =
    "INSERT INTO scheduled_posts (platform, content, scheduled_date) VALUES (?, ?, ?)";

const SELECT_POSTS: &str = r#"
    SELECT id, platform, content, scheduled_date, status,
           COALESCE(CAST(created_at AS TEXT), '') AS created_at
    FROM scheduled_posts
    ORDER BY scheduled_date ASC, id ASC
"#;

/// A post that was approved but not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPost {
    /// Position in the submitted batch
    pub index: usize,
    pub post: CampaignPost,
    pub reason: String,
}

/// Outcome of scheduling a batch of approved posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Ids of the inserted rows, in submission order
    pub scheduled: Vec<i64>,
    pub skipped: Vec<SkippedPost>,
}

impl CommitReport {
    /// Number of posts submitted.
    pub fn submitted(&self) -> usize {
        self.scheduled.len() + self.skipped.len()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// One-line operator summary, e.g. `8 of 9 posts scheduled, 1 skipped: invalid date`.
    pub fn summary(&self) -> String {
        let mut line = format!("{} of {} posts scheduled", self.scheduled.len(), self.submitted());
        if !self.skipped.is_empty() {
            let reasons: Vec<&str> = self.skipped.iter().map(|s| s.reason.as_str()).collect();
            line.push_str(&format!(", {} skipped: {}", self.skipped.len(), reasons.join("; ")));
        }
        line
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    platform: String,
    content: String,
    scheduled_date: String,
    status: String,
    created_at: String,
}

impl PostRow {
    fn into_scheduled_post(self) -> CampaignResult<ScheduledPost> {
        let platform: Platform = self
            .platform
            .parse()
            .map_err(|reason| CampaignError::CorruptRow { id: self.id, reason })?;

        Ok(ScheduledPost {
            id: self.id,
            platform,
            content: self.content,
            scheduled_date: self.scheduled_date,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

/// Schedule store over the `scheduled_posts` table.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    path: PathBuf,
    options: SqliteConnectOptions,
}

impl ScheduleStore {
    /// Create a store for the database file at `path`.
    ///
    /// Nothing is opened until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
        Self { path, options }
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection. Dropping it releases the underlying handle.
    async fn connect(&self) -> CampaignResult<SqliteConnection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = SqliteConnection::connect_with(&self.options).await?;
        debug!(path = %self.path.display(), "Connected to database");
        Ok(conn)
    }

    /// Ensure the table exists. Existing rows are kept.
    pub async fn initialize(&self) -> CampaignResult<()> {
        let mut conn = self.connect().await?;
        sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
        conn.close().await?;

        info!(path = %self.path.display(), "Database initialized");
        Ok(())
    }

    /// Store one post.
    ///
    /// A malformed date is logged and rejected before any row is written.
    pub async fn schedule(
        &self,
        platform: Platform,
        content: &str,
        scheduled_date: &str,
    ) -> CampaignResult<i64> {
        if let Err(e) = parse_schedule_date(scheduled_date) {
            error!(date = %scheduled_date, "{e}");
            return Err(e);
        }

        let mut conn = self.connect().await?;
        let id = insert_post(&mut conn, platform, content, scheduled_date).await?;
        conn.close().await?;
        Ok(id)
    }

    /// Store a batch of posts over one connection, in order.
    ///
    /// Posts that fail validation or insertion are skipped and reported;
    /// the rest are stored.
    pub async fn schedule_batch(&self, posts: &[CampaignPost]) -> CampaignResult<CommitReport> {
        let mut report = CommitReport::default();
        let mut conn = self.connect().await?;

        for (index, post) in posts.iter().enumerate() {
            let outcome = match parse_schedule_date(&post.scheduled_date) {
                Ok(_) => {
                    insert_post(&mut conn, post.platform, &post.content, &post.scheduled_date)
                        .await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(id) => report.scheduled.push(id),
                Err(e) => {
                    error!(index, date = %post.scheduled_date, "{e}");
                    let reason = match e {
                        CampaignError::InvalidDate(ref date) => format!("invalid date '{date}'"),
                        ref other => other.to_string(),
                    };
                    report.skipped.push(SkippedPost { index, post: post.clone(), reason });
                }
            }
        }

        conn.close().await?;
        info!(
            scheduled = report.scheduled.len(),
            skipped = report.skipped.len(),
            "Scheduled campaign batch"
        );
        Ok(report)
    }

    /// Every stored post, by date then insertion order.
    pub async fn list_all(&self) -> CampaignResult<Vec<ScheduledPost>> {
        let mut conn = self.connect().await?;
        let rows: Vec<PostRow> = sqlx::query_as(SELECT_POSTS).fetch_all(&mut conn).await?;
        conn.close().await?;

        rows.into_iter().map(PostRow::into_scheduled_post).collect()
    }
}

async fn insert_post(
    conn: &mut SqliteConnection,
    platform: Platform,
    content: &str,
    scheduled_date: &str,
) -> CampaignResult<i64> {
    let result = sqlx::query(INSERT_POST)
        .bind(platform.name())
        .bind(content)
        .bind(scheduled_date)
        .execute(&mut *conn)
        .await?;

    info!(platform = %platform, date = %scheduled_date, "Scheduled post");
    Ok(result.last_insert_rowid())
}
