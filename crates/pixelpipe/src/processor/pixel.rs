//! Reference processor: image metadata extraction and thumbnail rendering.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use serde_json::{json, Map, Value};

use crate::error::ProcessError;
use crate::processor::{ImageProcessor, Outcome};

/// Thumbnail variants rendered for every successful job.
const THUMBNAIL_SIZES: &[(&str, u32)] = &[("small", 150), ("medium", 300)];

/// Decodes images, extracts basic metadata and renders JPEG thumbnails
/// into a flat directory, addressed as `<job id>_<size>.jpg`.
pub struct PixelProcessor {
    thumbnail_dir: PathBuf,
}

impl PixelProcessor {
    /// Creates the processor, ensuring the thumbnail directory exists.
    pub fn new(thumbnail_dir: impl Into<PathBuf>) -> Result<Self, ProcessError> {
        let thumbnail_dir = thumbnail_dir.into();
        std::fs::create_dir_all(&thumbnail_dir).map_err(|e| ProcessError::CreateDirectory {
            path: thumbnail_dir.clone(),
            source: e,
        })?;
        Ok(Self { thumbnail_dir })
    }

    /// Path a thumbnail is written to for a given job and size label.
    pub fn thumbnail_path(&self, id: &str, size: &str) -> PathBuf {
        self.thumbnail_dir.join(format!("{}_{}.jpg", id, size))
    }

    fn run(&self, id: &str, path: &Path) -> Result<Map<String, Value>, ProcessError> {
        let data = std::fs::read(path).map_err(|e| ProcessError::ReadImage {
            path: path.to_path_buf(),
            source: e,
        })?;

        let format =
            image::guess_format(&data).map_err(|e| ProcessError::Decode(e.to_string()))?;
        let img = image::load_from_memory_with_format(&data, format)
            .map_err(|e| ProcessError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let mut metadata = Map::new();
        metadata.insert("width".to_string(), json!(width));
        metadata.insert("height".to_string(), json!(height));
        metadata.insert(
            "format".to_string(),
            json!(format.extensions_str().first().copied().unwrap_or("unknown")),
        );
        metadata.insert("size_bytes".to_string(), json!(data.len()));

        for (label, edge) in THUMBNAIL_SIZES {
            self.write_thumbnail(&img, id, label, *edge)?;
        }

        Ok(metadata)
    }

    fn write_thumbnail(
        &self,
        img: &DynamicImage,
        id: &str,
        label: &str,
        edge: u32,
    ) -> Result<(), ProcessError> {
        let target = self.thumbnail_path(id, label);
        // JPEG has no alpha channel; flatten before encoding.
        let thumb = img.thumbnail(edge, edge).to_rgb8();
        thumb.save(&target).map_err(|e| ProcessError::Thumbnail {
            path: target,
            reason: e.to_string(),
        })
    }
}

impl ImageProcessor for PixelProcessor {
    fn process(&self, id: &str, path: &Path) -> Outcome {
        let _span = tracing::info_span!("processor.pixel", job_id = %id).entered();
        let started = Instant::now();

        match self.run(id, path) {
            Ok(metadata) => Outcome::Success {
                metadata,
                duration: started.elapsed().as_secs_f64(),
            },
            Err(e) => {
                log::error!("Processing failed for job {}: {}", id, e);
                Outcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }
}
