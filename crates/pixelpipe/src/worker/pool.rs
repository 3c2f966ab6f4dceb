//! Worker pool — executes submitted jobs and commits their outcomes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info, warn};

use crate::db::DatabaseError;
use crate::error::WorkerError;
use crate::processor::{ImageProcessor, Outcome};
use crate::store::{JobStore, TerminalOutcome};
use crate::worker::job::Job;

pub struct WorkerPool {
    job_sender: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Creates a pool of `worker_count` threads committing outcomes to
    /// `store` through the given processor.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(store: JobStore, processor: Arc<dyn ImageProcessor>, worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (job_sender, job_receiver) = bounded::<Job>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let worker_store = store.clone();
            let worker_processor = Arc::clone(&processor);

            let handle = thread::spawn(move || {
                run_worker(worker_id, job_rx, shutdown_flag, worker_store, worker_processor);
            });

            workers.push(handle);
        }

        info!("Started {} workers", worker_count);

        Self {
            job_sender,
            workers,
            shutdown,
        }
    }

    pub fn submit(&self, job: Job) -> Result<(), WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)
    }

    pub fn shutdown(&self) {
        info!("Shutting down worker pool...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn wait(self) {
        // Drop sender to signal workers to exit
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(
    worker_id: usize,
    job_receiver: Receiver<Job>,
    shutdown: Arc<AtomicBool>,
    store: JobStore,
    processor: Arc<dyn ImageProcessor>,
) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => execute(worker_id, &job, &store, processor.as_ref()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}

/// Runs the processor for one job and commits the terminal outcome.
///
/// Success carries the processor-reported duration; failure carries the
/// elapsed time measured around the invocation. A duplicate completion
/// losing the commit race is logged and dropped, keeping the first
/// stored result.
fn execute(worker_id: usize, job: &Job, store: &JobStore, processor: &dyn ImageProcessor) {
    debug!(
        "Worker {} processing job {} ({})",
        worker_id, job.id, job.original_name
    );

    let started = Instant::now();
    let outcome = processor.process(&job.id, &job.source_path);
    let elapsed = started.elapsed().as_secs_f64();

    let terminal = match outcome {
        Outcome::Success { metadata, duration } => {
            info!("Successfully processed {} in {:.2}s", job.id, duration);
            TerminalOutcome::Success { metadata, duration }
        }
        Outcome::Failure { reason } => {
            error!("Failed to process {}. Error: {}", job.id, reason);
            TerminalOutcome::Failed {
                reason,
                duration: elapsed,
            }
        }
    };

    match store.commit_terminal(&job.id, &terminal) {
        Ok(()) => {}
        Err(DatabaseError::AlreadyTerminal { id }) => {
            warn!("Job {} was already committed; keeping the first result", id);
        }
        Err(e) => error!("Failed to commit outcome for job {}: {}", job.id, e),
    }
}
