//! Logging initialisation for embedding applications.
//!
//! The crate itself only emits `log` records and `tracing` spans; wiring
//! them to an output is the embedder's choice. [`init`] installs a
//! reasonable default: env-filtered fmt output, optionally to a log file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file '{path}': {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install log bridge: {0}")]
    LogBridge(#[from] log::SetLoggerError),

    #[error("Failed to install subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs the global tracing subscriber.
///
/// `log` records from this crate and its dependencies are bridged into
/// tracing. With a `log_file`, output goes there without ANSI colors;
/// otherwise it goes to stderr. The filter comes from `RUST_LOG`,
/// defaulting to `info`. Call at most once per process.
pub fn init(log_file: Option<&Path>) -> Result<(), LoggingError> {
    tracing_log::LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| LoggingError::OpenLogFile {
                path: path.to_path_buf(),
                source: e,
            })?;
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)));
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = Registry::default()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
