//! Typed job store over the SQLite repositories.
//!
//! Owns the conversion between raw `jobs` rows and [`JobRecord`]s and
//! stamps submission/completion timestamps. All consistency guarantees
//! (duplicate rejection, first-terminal-commit-wins) live in
//! [`crate::db::job_repo`]; this layer only adds types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::job_repo::{self, JobRow};
use crate::db::stats_repo::{self, PipelineStats};
use crate::db::{Database, DatabaseError};

/// Current state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }

    /// Returns true for `success` and `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

fn parse_status(s: &str, job_id: &str) -> JobStatus {
    match s {
        "processing" => JobStatus::Processing,
        "success" => JobStatus::Success,
        "failed" => JobStatus::Failed,
        other => {
            log::warn!(
                "Unknown job status '{}' for job {}, defaulting to processing",
                other,
                job_id
            );
            JobStatus::Processing
        }
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            log::warn!("parse_timestamp: failed to parse '{}': {}", s, e);
            Utc::now()
        })
}

fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// The terminal result committed for a job, exactly once.
#[derive(Debug, Clone)]
pub enum TerminalOutcome {
    /// Processing succeeded; `duration` is the processing time in seconds.
    Success {
        metadata: Map<String, Value>,
        duration: f64,
    },
    /// Processing failed; `duration` is the elapsed time the controller
    /// attributes to the attempt (0 for pre-flight rejections).
    Failed { reason: String, duration: f64 },
}

/// A job record as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub original_name: String,
    pub status: JobStatus,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    fn from_row(row: &JobRow) -> Self {
        let metadata: Map<String, Value> = row
            .metadata
            .as_ref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();

        Self {
            id: row.id.clone(),
            original_name: row.original_name.clone(),
            status: parse_status(&row.status, &row.id),
            metadata,
            error: row.error.clone(),
            processed_at: row.processed_at.as_deref().map(parse_timestamp),
            duration: row.duration,
            created_at: parse_timestamp(&row.created_at),
        }
    }

    /// Returns true once the job reached `success` or `failed`.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Persistent job store backed by rusqlite.
///
/// Cloning is cheap (the handle is `Arc`-based); every clone sees the
/// same records.
#[derive(Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Creates a job in the `processing` state, stamped with the current
    /// time. Fails with [`DatabaseError::DuplicateJob`] on id reuse.
    pub fn create(&self, id: &str, original_name: &str) -> Result<(), DatabaseError> {
        job_repo::create(&self.db, id, original_name, &format_timestamp(Utc::now()))
    }

    /// Commits the terminal outcome for a job. The first commit wins;
    /// later attempts fail with [`DatabaseError::AlreadyTerminal`] and
    /// leave the stored record untouched.
    pub fn commit_terminal(
        &self,
        id: &str,
        outcome: &TerminalOutcome,
    ) -> Result<(), DatabaseError> {
        let processed_at = format_timestamp(Utc::now());
        match outcome {
            TerminalOutcome::Success { metadata, duration } => {
                let metadata_json = serde_json::to_string(metadata).ok();
                job_repo::commit_terminal(
                    &self.db,
                    id,
                    JobStatus::Success.as_str(),
                    metadata_json.as_deref(),
                    None,
                    &processed_at,
                    *duration,
                )
            }
            TerminalOutcome::Failed { reason, duration } => job_repo::commit_terminal(
                &self.db,
                id,
                JobStatus::Failed.as_str(),
                Some("{}"),
                Some(reason),
                &processed_at,
                *duration,
            ),
        }
    }

    /// Returns the job with the given id.
    pub fn get(&self, id: &str) -> Result<JobRecord, DatabaseError> {
        match job_repo::find_by_id(&self.db, id)? {
            Some(row) => Ok(JobRecord::from_row(&row)),
            None => Err(DatabaseError::JobNotFound { id: id.to_string() }),
        }
    }

    /// Returns every job ever created, newest first.
    pub fn list_all(&self) -> Result<Vec<JobRecord>, DatabaseError> {
        Ok(job_repo::list_all(&self.db)?
            .iter()
            .map(JobRecord::from_row)
            .collect())
    }

    /// Computes aggregate statistics from the current job population.
    pub fn stats(&self) -> Result<PipelineStats, DatabaseError> {
        stats_repo::fetch(&self.db)
    }
}
