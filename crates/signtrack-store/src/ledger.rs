//! The job ledger: videos, jobs, and quality issues in SQLite.
//!
//! Every mutating operation runs inside a transaction that commits on
//! success and rolls back on any error, so a crash mid-update leaves the
//! prior committed state. Job status transitions follow the state machine
//! in `signtrack_models::JobStatus`; moving a terminal job is an error.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, QueryBuilder, SqlitePool, Transaction};
use tracing::info;

use signtrack_models::{
    IssueId, Job, JobId, JobOutcome, JobStatus, NewVideo, QualityIssue, ScoredIssue, Video, VideoId,
};

use crate::error::{StoreError, StoreResult};

/// Embedded schema, applied idempotently by [`Ledger::init_schema`].
///
/// `videos.filename` is deliberately not UNIQUE; uniqueness is provided by
/// the atomic lookup-or-insert in [`Ledger::ensure_video_and_create_job`].
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    filename TEXT NOT NULL,
    local_path TEXT NOT NULL,
    remote_url TEXT,
    content_hash TEXT
);

CREATE INDEX IF NOT EXISTS idx_videos_filename ON videos(filename);
CREATE INDEX IF NOT EXISTS idx_videos_label ON videos(label);

CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    video_id TEXT NOT NULL REFERENCES videos(id),
    status TEXT NOT NULL DEFAULT 'queued',
    started_at TEXT,
    finished_at TEXT,
    error TEXT,
    quality_score REAL,
    frame_count INTEGER,
    provider_name TEXT,
    output_format TEXT
);

CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
CREATE INDEX IF NOT EXISTS idx_jobs_video ON jobs(video_id);

CREATE TABLE IF NOT EXISTS quality_issues (
    id TEXT PRIMARY KEY,
    job_id TEXT NOT NULL REFERENCES jobs(id),
    issue_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    frame_start INTEGER,
    frame_end INTEGER,
    details TEXT
);

CREATE INDEX IF NOT EXISTS idx_quality_issues_job ON quality_issues(job_id);
"#;

/// Column list for `jobs` queries.
const JOB_COLUMNS: &str = "id, video_id, status, started_at, finished_at, error, \
     quality_score, frame_count, provider_name, output_format";

/// The persistent job ledger.
#[derive(Clone)]
pub struct Ledger {
    pool: SqlitePool,
}

/// Filters for [`Ledger::list_jobs`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    /// Only jobs in this status
    pub status: Option<JobStatus>,
    /// Case-sensitive prefix match on the video label
    pub label_prefix: Option<String>,
    /// Minimum quality score; jobs without a score always pass
    pub min_quality: Option<f64>,
    /// Result count limit
    pub limit: Option<u32>,
}

impl JobFilter {
    /// Filter for queued jobs, the default batch input.
    pub fn queued() -> Self {
        Self {
            status: Some(JobStatus::Queued),
            ..Self::default()
        }
    }
}

/// A job row joined with its video's identifying fields.
#[derive(Debug, Clone, PartialEq)]
pub struct JobListing {
    pub job: Job,
    pub label: String,
    pub filename: String,
    pub local_path: String,
}

/// Result of the atomic "ensure video, then create job" operation.
#[derive(Debug, Clone)]
pub struct EnsuredJob {
    pub video: Video,
    pub job: Job,
    /// Whether the video row was inserted by this call
    pub video_created: bool,
}

/// Aggregates over the ledger for reporting.
#[derive(Debug, Clone, Default)]
pub struct LedgerStats {
    pub by_status: HashMap<JobStatus, i64>,
    pub quality: QualityStats,
    pub total_videos: i64,
}

/// Quality score distribution over scored jobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityStats {
    pub avg: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(FromRow)]
struct VideoRow {
    id: String,
    label: String,
    filename: String,
    local_path: String,
    remote_url: Option<String>,
    content_hash: Option<String>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: VideoId::from_string(row.id),
            label: row.label,
            filename: row.filename,
            local_path: row.local_path,
            remote_url: row.remote_url,
            content_hash: row.content_hash,
        }
    }
}

#[derive(FromRow)]
struct JobRow {
    id: String,
    video_id: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    error: Option<String>,
    quality_score: Option<f64>,
    frame_count: Option<i64>,
    provider_name: Option<String>,
    output_format: Option<String>,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<JobStatus>()
            .map_err(|e| StoreError::corrupt_row(e.to_string()))?;
        Ok(Job {
            id: JobId::from_string(row.id),
            video_id: VideoId::from_string(row.video_id),
            status,
            started_at: row.started_at,
            finished_at: row.finished_at,
            error: row.error,
            quality_score: row.quality_score,
            frame_count: row.frame_count.map(|n| n as u32),
            provider_name: row.provider_name,
            output_format: row.output_format,
        })
    }
}

#[derive(FromRow)]
struct JobListingRow {
    #[sqlx(flatten)]
    job: JobRow,
    label: String,
    filename: String,
    local_path: String,
}

impl TryFrom<JobListingRow> for JobListing {
    type Error = StoreError;

    fn try_from(row: JobListingRow) -> Result<Self, Self::Error> {
        Ok(JobListing {
            job: row.job.try_into()?,
            label: row.label,
            filename: row.filename,
            local_path: row.local_path,
        })
    }
}

#[derive(FromRow)]
struct IssueRow {
    id: String,
    job_id: String,
    issue_type: String,
    severity: String,
    frame_start: Option<i64>,
    frame_end: Option<i64>,
    details: Option<String>,
}

impl TryFrom<IssueRow> for QualityIssue {
    type Error = StoreError;

    fn try_from(row: IssueRow) -> Result<Self, Self::Error> {
        let severity = serde_json::from_value(serde_json::Value::String(row.severity.clone()))
            .map_err(|_| StoreError::corrupt_row(format!("unknown severity: {}", row.severity)))?;
        let frame_range = match (row.frame_start, row.frame_end) {
            (Some(start), Some(end)) => Some((start as u32, end as u32)),
            _ => None,
        };
        Ok(QualityIssue {
            id: IssueId(row.id),
            job_id: JobId::from_string(row.job_id),
            issue_type: row.issue_type,
            severity,
            frame_range,
            details: row.details,
        })
    }
}

impl Ledger {
    /// Open (creating if missing) a ledger database file.
    pub async fn connect(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Open an in-memory ledger (used by tests).
    pub async fn connect_in_memory() -> StoreResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        // A single connection keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the schema. Idempotent.
    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Ledger schema initialized");
        Ok(())
    }

    /// Atomically look up a video by filename — inserting it if unseen —
    /// and create a fresh queued job against it.
    pub async fn ensure_video_and_create_job(&self, new: &NewVideo) -> StoreResult<EnsuredJob> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, VideoRow>(
            "SELECT id, label, filename, local_path, remote_url, content_hash \
             FROM videos WHERE filename = ?",
        )
        .bind(&new.filename)
        .fetch_optional(&mut *tx)
        .await?;

        let (video, video_created) = match existing {
            Some(row) => (Video::from(row), false),
            None => {
                let video = Video {
                    id: VideoId::new(),
                    label: new.label.clone(),
                    filename: new.filename.clone(),
                    local_path: new.local_path.clone(),
                    remote_url: new.remote_url.clone(),
                    content_hash: new.content_hash.clone(),
                };
                sqlx::query(
                    "INSERT INTO videos (id, label, filename, local_path, remote_url, content_hash) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                )
                .bind(video.id.as_str())
                .bind(&video.label)
                .bind(&video.filename)
                .bind(&video.local_path)
                .bind(&video.remote_url)
                .bind(&video.content_hash)
                .execute(&mut *tx)
                .await?;
                (video, true)
            }
        };

        let job = Job::queued(video.id.clone());
        sqlx::query("INSERT INTO jobs (id, video_id, status) VALUES (?, ?, ?)")
            .bind(job.id.as_str())
            .bind(job.video_id.as_str())
            .bind(job.status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(EnsuredJob {
            video,
            job,
            video_created,
        })
    }

    /// Find a video by its ledger-unique filename.
    pub async fn find_video_by_filename(&self, filename: &str) -> StoreResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(
            "SELECT id, label, filename, local_path, remote_url, content_hash \
             FROM videos WHERE filename = ?",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }

    /// Find a video by content hash.
    pub async fn find_video_by_hash(&self, content_hash: &str) -> StoreResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(
            "SELECT id, label, filename, local_path, remote_url, content_hash \
             FROM videos WHERE content_hash = ?",
        )
        .bind(content_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Video::from))
    }

    /// Fetch a single job.
    pub async fn get_job(&self, job_id: &JobId) -> StoreResult<Job> {
        let query = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?");
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(job_id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        row.try_into()
    }

    /// Transition a job to `Processing`, recording the start timestamp.
    pub async fn mark_processing(&self, job_id: &JobId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        self.guard_transition(&mut tx, job_id, JobStatus::Processing)
            .await?;
        sqlx::query("UPDATE jobs SET status = ?, started_at = ? WHERE id = ?")
            .bind(JobStatus::Processing.as_str())
            .bind(Utc::now())
            .bind(job_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Transition a job to `Done`, recording the finish timestamp and the
    /// outcome fields. Unrelated fields are left untouched.
    pub async fn mark_done(&self, job_id: &JobId, outcome: &JobOutcome) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        self.guard_transition(&mut tx, job_id, JobStatus::Done).await?;
        sqlx::query(
            "UPDATE jobs SET status = ?, finished_at = ?, quality_score = ?, \
             frame_count = ?, provider_name = ?, output_format = ? WHERE id = ?",
        )
        .bind(JobStatus::Done.as_str())
        .bind(Utc::now())
        .bind(outcome.quality_score)
        .bind(outcome.frame_count as i64)
        .bind(&outcome.provider_name)
        .bind(&outcome.output_format)
        .bind(job_id.as_str())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Transition a job to `Failed` with an error message; quality fields
    /// remain NULL.
    pub async fn mark_failed(&self, job_id: &JobId, error: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        self.guard_transition(&mut tx, job_id, JobStatus::Failed)
            .await?;
        sqlx::query("UPDATE jobs SET status = ?, finished_at = ?, error = ? WHERE id = ?")
            .bind(JobStatus::Failed.as_str())
            .bind(Utc::now())
            .bind(error)
            .bind(job_id.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Append a quality issue raised by the scorer to a job.
    pub async fn add_issue(
        &self,
        job_id: &JobId,
        issue: &ScoredIssue,
        frame_range: Option<(u32, u32)>,
    ) -> StoreResult<QualityIssue> {
        let persisted = QualityIssue {
            id: IssueId::new(),
            job_id: job_id.clone(),
            issue_type: issue.kind.as_str().to_string(),
            severity: issue.severity,
            frame_range,
            details: Some(serde_json::to_string(issue)?),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO quality_issues (id, job_id, issue_type, severity, frame_start, frame_end, details) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(persisted.id.as_str())
        .bind(persisted.job_id.as_str())
        .bind(&persisted.issue_type)
        .bind(persisted.severity.as_str())
        .bind(frame_range.map(|(start, _)| start as i64))
        .bind(frame_range.map(|(_, end)| end as i64))
        .bind(&persisted.details)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(persisted)
    }

    /// All issues recorded against a job, in insertion order.
    pub async fn issues_for_job(&self, job_id: &JobId) -> StoreResult<Vec<QualityIssue>> {
        let rows = sqlx::query_as::<_, IssueRow>(
            "SELECT id, job_id, issue_type, severity, frame_start, frame_end, details \
             FROM quality_issues WHERE job_id = ? ORDER BY rowid",
        )
        .bind(job_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(QualityIssue::try_from).collect()
    }

    /// List jobs joined with their videos, ordered by label then filename.
    ///
    /// Jobs without a quality score pass any minimum-quality filter. The
    /// label prefix match is case-sensitive (SQLite `LIKE` is not, so the
    /// query compares an explicit prefix slice instead).
    pub async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<JobListing>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT j.id, j.video_id, j.status, j.started_at, j.finished_at, j.error, \
             j.quality_score, j.frame_count, j.provider_name, j.output_format, \
             v.label, v.filename, v.local_path \
             FROM jobs j JOIN videos v ON j.video_id = v.id WHERE 1=1",
        );

        if let Some(status) = filter.status {
            qb.push(" AND j.status = ").push_bind(status.as_str());
        }
        if let Some(prefix) = &filter.label_prefix {
            qb.push(" AND substr(v.label, 1, ")
                .push_bind(prefix.chars().count() as i64)
                .push(") = ")
                .push_bind(prefix.clone());
        }
        if let Some(min_quality) = filter.min_quality {
            qb.push(" AND (j.quality_score IS NULL OR j.quality_score >= ")
                .push_bind(min_quality)
                .push(")");
        }
        qb.push(" ORDER BY v.label, v.filename");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb
            .build_query_as::<JobListingRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(JobListing::try_from).collect()
    }

    /// Ledger-wide aggregates: status histogram, quality distribution,
    /// total video count.
    pub async fn stats(&self) -> StoreResult<LedgerStats> {
        let status_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM jobs GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let mut by_status = HashMap::new();
        for (status, count) in status_rows {
            let status = status
                .parse::<JobStatus>()
                .map_err(|e| StoreError::corrupt_row(e.to_string()))?;
            by_status.insert(status, count);
        }

        let (avg, min, max): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT AVG(quality_score), MIN(quality_score), MAX(quality_score) \
             FROM jobs WHERE quality_score IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        let total_videos: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos")
            .fetch_one(&self.pool)
            .await?;

        Ok(LedgerStats {
            by_status,
            quality: QualityStats { avg, min, max },
            total_videos,
        })
    }

    /// Check that a job exists and is not terminal before a transition.
    async fn guard_transition(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        job_id: &JobId,
        to: JobStatus,
    ) -> StoreResult<()> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?")
            .bind(job_id.as_str())
            .fetch_optional(&mut **tx)
            .await?;
        let status = status.ok_or_else(|| StoreError::JobNotFound(job_id.to_string()))?;
        let from = status
            .parse::<JobStatus>()
            .map_err(|e| StoreError::corrupt_row(e.to_string()))?;
        if from.is_terminal() {
            return Err(StoreError::InvalidTransition {
                job: job_id.to_string(),
                from,
                to,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signtrack_models::{IssueKind, IssueSeverity};

    async fn ledger() -> Ledger {
        let ledger = Ledger::connect_in_memory().await.unwrap();
        ledger.init_schema().await.unwrap();
        ledger
    }

    fn video(label: &str, filename: &str) -> NewVideo {
        NewVideo::local(label, filename, format!("/data/{filename}"))
    }

    #[tokio::test]
    async fn test_fresh_job_is_queued() {
        let ledger = ledger().await;
        let ensured = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();

        assert!(ensured.video_created);
        let job = ledger.get_job(&ensured.job.id).await.unwrap();
        assert_eq!(job.status, JobStatus::Queued);
        assert!(job.started_at.is_none());
        assert!(job.quality_score.is_none());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent_per_filename() {
        let ledger = ledger().await;
        let first = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();
        let second = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();

        assert!(first.video_created);
        assert!(!second.video_created);
        assert_eq!(first.video.id, second.video.id);
        // Reprocessing creates a new job against the same video
        assert_ne!(first.job.id, second.job.id);

        let stats = ledger.stats().await.unwrap();
        assert_eq!(stats.total_videos, 1);
        assert_eq!(stats.by_status[&JobStatus::Queued], 2);
    }

    #[tokio::test]
    async fn test_successful_run_transitions() {
        let ledger = ledger().await;
        let ensured = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();
        let job_id = ensured.job.id;

        ledger.mark_processing(&job_id).await.unwrap();
        let job = ledger.get_job(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.started_at.is_some());
        assert!(job.finished_at.is_none());

        let outcome = JobOutcome {
            quality_score: 0.84,
            frame_count: 75,
            provider_name: "mediapipe".into(),
            output_format: "jsonl".into(),
        };
        ledger.mark_done(&job_id, &outcome).await.unwrap();

        let job = ledger.get_job(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.quality_score, Some(0.84));
        assert_eq!(job.frame_count, Some(75));
        assert_eq!(job.provider_name.as_deref(), Some("mediapipe"));
        assert!(job.finished_at.is_some());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_quality_null() {
        let ledger = ledger().await;
        let ensured = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();
        let job_id = ensured.job.id;

        ledger.mark_processing(&job_id).await.unwrap();
        ledger
            .mark_failed(&job_id, "No frames extracted")
            .await
            .unwrap();

        let listings = ledger
            .list_jobs(&JobFilter {
                status: Some(JobStatus::Failed),
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(listings.len(), 1);
        let job = &listings[0].job;
        assert_eq!(job.error.as_deref(), Some("No frames extracted"));
        assert!(job.quality_score.is_none());
        assert!(job.frame_count.is_none());
    }

    #[tokio::test]
    async fn test_no_transition_out_of_terminal_states() {
        let ledger = ledger().await;
        let ensured = ledger
            .ensure_video_and_create_job(&video("hello", "hello_001.mp4"))
            .await
            .unwrap();
        let job_id = ensured.job.id;

        ledger.mark_processing(&job_id).await.unwrap();
        ledger.mark_failed(&job_id, "boom").await.unwrap();

        let err = ledger.mark_processing(&job_id).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        // The failed row is untouched history
        let job = ledger.get_job(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_list_jobs_filters_and_ordering() {
        let ledger = ledger().await;
        for (label, filename) in [
            ("takk", "takk_001.mp4"),
            ("hei", "hei_002.mp4"),
            ("hei", "hei_001.mp4"),
            ("Hei", "cased_001.mp4"),
        ] {
            ledger
                .ensure_video_and_create_job(&video(label, filename))
                .await
                .unwrap();
        }

        let all = ledger.list_jobs(&JobFilter::default()).await.unwrap();
        let labels: Vec<_> = all
            .iter()
            .map(|l| (l.label.as_str(), l.filename.as_str()))
            .collect();
        // Deterministic label-then-filename ordering
        assert_eq!(
            labels,
            vec![
                ("Hei", "cased_001.mp4"),
                ("hei", "hei_001.mp4"),
                ("hei", "hei_002.mp4"),
                ("takk", "takk_001.mp4"),
            ]
        );

        // Case-sensitive prefix match
        let hei = ledger
            .list_jobs(&JobFilter {
                label_prefix: Some("hei".into()),
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(hei.len(), 2);
        assert!(hei.iter().all(|l| l.label == "hei"));

        let limited = ledger
            .list_jobs(&JobFilter {
                limit: Some(2),
                ..JobFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_min_quality_filter_passes_unscored_jobs() {
        let ledger = ledger().await;
        let scored = ledger
            .ensure_video_and_create_job(&video("hei", "hei_001.mp4"))
            .await
            .unwrap();
        ledger.mark_processing(&scored.job.id).await.unwrap();
        ledger
            .mark_done(
                &scored.job.id,
                &JobOutcome {
                    quality_score: 0.3,
                    frame_count: 10,
                    provider_name: "mediapipe".into(),
                    output_format: "jsonl".into(),
                },
            )
            .await
            .unwrap();

        ledger
            .ensure_video_and_create_job(&video("takk", "takk_001.mp4"))
            .await
            .unwrap();

        let listings = ledger
            .list_jobs(&JobFilter {
                min_quality: Some(0.5),
                ..JobFilter::default()
            })
            .await
            .unwrap();

        // The 0.3-scored job is excluded; the unscored queued job passes.
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].label, "takk");
    }

    #[tokio::test]
    async fn test_issue_round_trip() {
        let ledger = ledger().await;
        let ensured = ledger
            .ensure_video_and_create_job(&video("hei", "hei_001.mp4"))
            .await
            .unwrap();

        let issue = ScoredIssue::new(
            IssueKind::LowHandVisibility,
            IssueSeverity::Warning,
            Some(0.4),
        );
        ledger
            .add_issue(&ensured.job.id, &issue, Some((0, 24)))
            .await
            .unwrap();

        let issues = ledger.issues_for_job(&ensured.job.id).await.unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "low_hand_visibility");
        assert_eq!(issues[0].severity, IssueSeverity::Warning);
        assert_eq!(issues[0].frame_range, Some((0, 24)));
        let details: ScoredIssue =
            serde_json::from_str(issues[0].details.as_deref().unwrap()).unwrap();
        assert_eq!(details, issue);
    }

    #[tokio::test]
    async fn test_stats_aggregates() {
        let ledger = ledger().await;
        for (label, filename, score) in [
            ("hei", "hei_001.mp4", Some(0.9)),
            ("takk", "takk_001.mp4", Some(0.5)),
            ("nei", "nei_001.mp4", None),
        ] {
            let ensured = ledger
                .ensure_video_and_create_job(&video(label, filename))
                .await
                .unwrap();
            if let Some(score) = score {
                ledger.mark_processing(&ensured.job.id).await.unwrap();
                ledger
                    .mark_done(
                        &ensured.job.id,
                        &JobOutcome {
                            quality_score: score,
                            frame_count: 10,
                            provider_name: "mediapipe".into(),
                            output_format: "jsonl".into(),
                        },
                    )
                    .await
                    .unwrap();
            }
        }

        let stats = ledger.stats().await.unwrap();
        assert_eq!(stats.total_videos, 3);
        assert_eq!(stats.by_status[&JobStatus::Done], 2);
        assert_eq!(stats.by_status[&JobStatus::Queued], 1);
        assert_eq!(stats.quality.min, Some(0.5));
        assert_eq!(stats.quality.max, Some(0.9));
        assert!((stats.quality.avg.unwrap() - 0.7).abs() < 1e-9);
    }
}
