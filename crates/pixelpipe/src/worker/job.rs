use std::path::{Path, PathBuf};

/// One unit of submitted work, carried through the worker channel.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// The submitted file's declared name.
    pub original_name: String,
    /// Path of the stored upload to process.
    pub source_path: PathBuf,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        original_name: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            source_path: source_path.into(),
        }
    }
}

/// Returns true when the path looks like an upload the pipeline accepts
/// (JPEG or PNG), judged by the mime_guess crate. Embedders use this to
/// compute the validity flag at submission time.
pub fn is_supported_image(path: &Path) -> bool {
    matches!(
        mime_guess::from_path(path).first_raw(),
        Some("image/jpeg") | Some("image/png")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_new() {
        let job = Job::new("job-1", "holiday.png", "/uploads/job-1_holiday.png");
        assert_eq!(job.id, "job-1");
        assert_eq!(job.original_name, "holiday.png");
        assert_eq!(job.source_path, PathBuf::from("/uploads/job-1_holiday.png"));
    }

    #[test]
    fn test_supported_image_types() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(is_supported_image(Path::new("photo.png")));
    }

    #[test]
    fn test_unsupported_types() {
        assert!(!is_supported_image(Path::new("animation.gif")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("archive.zip")));
        assert!(!is_supported_image(Path::new("noextension")));
    }
}
