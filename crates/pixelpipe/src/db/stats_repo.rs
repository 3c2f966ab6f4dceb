//! Pipeline statistics — aggregated from the `jobs` table at query time.

use serde::Serialize;

use super::{Database, DatabaseError};

/// Aggregate pipeline statistics.
///
/// Derived entirely from the `jobs` table on each call, so the numbers
/// can never drift from the stored records.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    pub total: u64,
    pub failed: u64,
    pub success_rate: String,
    pub average_processing_time_seconds: f64,
}

/// Computes summary statistics over the full job population.
///
/// Jobs still `processing` count toward `total` but not toward `failed`
/// or the average-duration denominator, so `success_rate` undercounts
/// eventual success while jobs are in flight.
pub fn fetch(db: &Database) -> Result<PipelineStats, DatabaseError> {
    db.with_conn(|conn| {
        let total: u64 = conn.query_row("SELECT COUNT(*) FROM jobs", [], |r| r.get(0))?;
        let failed: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE status = 'failed'",
            [],
            |r| r.get(0),
        )?;
        let avg_duration: f64 = conn.query_row(
            "SELECT COALESCE(AVG(duration), 0) FROM jobs WHERE status = 'success'",
            [],
            |r| r.get(0),
        )?;

        let rate = if total > 0 {
            (total - failed) as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(PipelineStats {
            total,
            failed,
            success_rate: format!("{:.2}%", rate),
            average_processing_time_seconds: (avg_duration * 100.0).round() / 100.0,
        })
    })
}
