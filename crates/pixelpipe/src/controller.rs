//! Job lifecycle controller — owns the `processing → terminal` transition.

use std::path::PathBuf;
use std::sync::Arc;

use log::warn;

use crate::db::stats_repo::PipelineStats;
use crate::error::Result;
use crate::processor::ImageProcessor;
use crate::store::{JobRecord, JobStore, TerminalOutcome};
use crate::worker::{Job, WorkerPool};

/// Failure reason committed when a submission is rejected before
/// processing.
const INVALID_INPUT_REASON: &str = "invalid file format";

/// Front door of the pipeline: creates job records, dispatches execution
/// to the worker pool, and serves status and statistics queries.
pub struct JobController {
    store: JobStore,
    pool: WorkerPool,
}

impl JobController {
    /// Creates a controller with one worker per CPU core.
    pub fn new(store: JobStore, processor: Arc<dyn ImageProcessor>) -> Self {
        Self::with_worker_count(store, processor, num_cpus::get().max(1))
    }

    pub fn with_worker_count(
        store: JobStore,
        processor: Arc<dyn ImageProcessor>,
        worker_count: usize,
    ) -> Self {
        let pool = WorkerPool::new(store.clone(), processor, worker_count);
        Self { store, pool }
    }

    /// Submits a new upload and returns its generated job id.
    ///
    /// Returns as soon as the job record exists; processing happens on
    /// the worker pool with no completion-order guarantee across jobs.
    pub fn submit(
        &self,
        original_name: &str,
        source_path: impl Into<PathBuf>,
        valid_input: bool,
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.submit_with_id(&id, original_name, source_path, valid_input)?;
        Ok(id)
    }

    /// Submits a new upload under a caller-chosen id.
    ///
    /// A duplicate id fails here, synchronously, before anything is
    /// scheduled. An upload flagged invalid is committed as `failed`
    /// immediately and never reaches the processor.
    pub fn submit_with_id(
        &self,
        id: &str,
        original_name: &str,
        source_path: impl Into<PathBuf>,
        valid_input: bool,
    ) -> Result<()> {
        let source_path = source_path.into();
        self.store.create(id, original_name)?;

        if !valid_input {
            warn!("Unable to process {}: unsupported upload", id);
            self.store.commit_terminal(
                id,
                &TerminalOutcome::Failed {
                    reason: INVALID_INPUT_REASON.to_string(),
                    duration: 0.0,
                },
            )?;
            return Ok(());
        }

        self.pool.submit(Job::new(id, original_name, source_path))?;
        Ok(())
    }

    /// Returns the current record for a job.
    pub fn job(&self, id: &str) -> Result<JobRecord> {
        Ok(self.store.get(id)?)
    }

    /// Returns every job ever submitted, regardless of status.
    pub fn jobs(&self) -> Result<Vec<JobRecord>> {
        Ok(self.store.list_all()?)
    }

    /// Computes aggregate statistics from the current job population.
    pub fn stats(&self) -> Result<PipelineStats> {
        Ok(self.store.stats()?)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Signals workers to stop picking up new jobs.
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    /// Drains the pool, blocking until in-flight jobs are committed.
    pub fn wait(self) {
        self.pool.wait();
    }
}
