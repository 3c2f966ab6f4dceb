//! Isolated pipeline instance over temp directories and an in-memory
//! database, with helpers to fabricate uploads and await completion.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use pixelpipe::{Database, JobController, JobRecord, JobStore, PixelProcessor};

pub struct TestHarness {
    _root: TempDir,
    pub uploads_dir: PathBuf,
    pub thumbnails_dir: PathBuf,
    pub controller: JobController,
}

impl TestHarness {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let uploads_dir = root.path().join("uploads");
        let thumbnails_dir = root.path().join("thumbnails");
        std::fs::create_dir_all(&uploads_dir).expect("create uploads dir");

        let db = Database::open_in_memory().expect("open in-memory database");
        let store = JobStore::new(db);
        let processor =
            Arc::new(PixelProcessor::new(&thumbnails_dir).expect("create pixel processor"));
        let controller = JobController::with_worker_count(store, processor, 2);

        Self {
            _root: root,
            uploads_dir,
            thumbnails_dir,
            controller,
        }
    }

    /// Writes a synthetic PNG upload and returns its path.
    pub fn write_png(&self, name: &str, width: u32, height: u32) -> PathBuf {
        let path = self.uploads_dir.join(name);
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save(&path).expect("write test image");
        path
    }

    /// Writes a file with arbitrary bytes (for corrupt/unsupported cases).
    pub fn write_raw(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.uploads_dir.join(name);
        std::fs::write(&path, bytes).expect("write test file");
        path
    }

    /// Polls the store until the job reaches a terminal state.
    pub fn wait_terminal(&self, id: &str) -> JobRecord {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let record = self.controller.job(id).expect("job should exist");
            if record.is_terminal() {
                return record;
            }
            assert!(
                Instant::now() < deadline,
                "job {} never became terminal",
                id
            );
            std::thread::sleep(Duration::from_millis(10));
        }
    }
}
