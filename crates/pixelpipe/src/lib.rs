pub mod controller;
pub mod db;
pub mod error;
pub mod logging;
pub mod processor;
pub mod store;
pub mod worker;

pub use controller::JobController;
pub use db::stats_repo::PipelineStats;
pub use db::{Database, DatabaseError};
pub use error::{PixelpipeError, ProcessError, Result, WorkerError};
pub use processor::{ImageProcessor, Outcome, PixelProcessor};
pub use store::{JobRecord, JobStatus, JobStore, TerminalOutcome};
pub use worker::{Job, WorkerPool};
