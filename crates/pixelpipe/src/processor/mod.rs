//! Processor boundary — the capability that turns a stored upload into
//! metadata and derived artifacts.

pub mod pixel;

use std::path::Path;

use serde_json::{Map, Value};

pub use pixel::PixelProcessor;

/// Result of processing one job.
///
/// Failure is a normal, expected value here, not an error: implementations
/// must catch their internal errors and classify them as
/// [`Outcome::Failure`], because the commit path accepts whatever comes
/// back and a job only gets one terminal commit.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Processing succeeded. `metadata` carries at least `width`,
    /// `height`, `format` and `size_bytes`; `duration` is the processing
    /// time in seconds.
    Success {
        metadata: Map<String, Value>,
        duration: f64,
    },
    /// Processing failed; `reason` is a human-readable description.
    Failure { reason: String },
}

/// A processing capability invoked once per job.
///
/// Injected into the controller rather than reached through a global, so
/// tests substitute a double and embedders control initialization order.
pub trait ImageProcessor: Send + Sync {
    /// Processes the file at `path` on behalf of job `id`.
    fn process(&self, id: &str, path: &Path) -> Outcome;
}
