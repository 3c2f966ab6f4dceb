//! Job repository — lifecycle operations on the `jobs` table.

use rusqlite::{params, ErrorCode, Row};

use super::{Database, DatabaseError};

/// A raw job row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRow {
    pub id: String,
    pub original_name: String,
    pub status: String,
    pub metadata: Option<String>,
    pub processed_at: Option<String>,
    pub error: Option<String>,
    pub duration: f64,
    pub created_at: String,
}

impl JobRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            original_name: row.get("original_name")?,
            status: row.get("status")?,
            metadata: row.get("metadata")?,
            processed_at: row.get("processed_at")?,
            error: row.get("error")?,
            duration: row.get("duration")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Inserts a new job in the `processing` state.
///
/// Fails with [`DatabaseError::DuplicateJob`] when the id is already
/// taken; the existing row is left untouched.
pub fn create(
    db: &Database,
    id: &str,
    original_name: &str,
    created_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let result = conn.execute(
            "INSERT INTO jobs (id, original_name, status, duration, created_at)
             VALUES (?1, ?2, 'processing', 0, ?3)",
            params![id, original_name, created_at],
        );
        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(DatabaseError::DuplicateJob { id: id.to_string() })
            }
            Err(e) => Err(DatabaseError::Sqlite(e)),
        }
    })
}

/// Transitions a job to a terminal state.
///
/// The UPDATE only matches rows still in `processing`, so the first
/// terminal commit wins. Zero affected rows is resolved to
/// [`DatabaseError::JobNotFound`] (unknown id) or
/// [`DatabaseError::AlreadyTerminal`] (a prior commit won the race).
pub fn commit_terminal(
    db: &Database,
    id: &str,
    status: &str,
    metadata: Option<&str>,
    error: Option<&str>,
    processed_at: &str,
    duration: f64,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        let affected = conn.execute(
            "UPDATE jobs SET status=?2, metadata=?3, error=?4, processed_at=?5, duration=?6
             WHERE id=?1 AND status='processing'",
            params![id, status, metadata, error, processed_at, duration],
        )?;
        if affected == 1 {
            return Ok(());
        }

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1)",
            params![id],
            |r| r.get(0),
        )?;
        if exists {
            Err(DatabaseError::AlreadyTerminal { id: id.to_string() })
        } else {
            Err(DatabaseError::JobNotFound { id: id.to_string() })
        }
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], JobRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Returns every job row, newest first.
pub fn list_all(db: &Database) -> Result<Vec<JobRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs ORDER BY created_at DESC")?;
        let rows: Vec<JobRow> = stmt
            .query_map([], JobRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Counts jobs with the given status.
pub fn count_by_status(db: &Database, status: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status = ?1",
            params![status],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}
