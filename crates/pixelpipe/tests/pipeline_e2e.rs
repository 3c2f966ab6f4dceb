//! End-to-end tests: submit real images through the full pipeline and
//! verify stored records, thumbnails and statistics.

mod common;

use common::TestHarness;

use pixelpipe::worker::is_supported_image;
use pixelpipe::JobStatus;
use serde_json::json;

#[test]
fn processes_png_upload_to_success() {
    let harness = TestHarness::new();
    let path = harness.write_png("photo.png", 64, 48);

    let id = harness
        .controller
        .submit("photo.png", &path, is_supported_image(&path))
        .unwrap();
    let record = harness.wait_terminal(&id);

    assert_eq!(record.status, JobStatus::Success);
    assert_eq!(record.original_name, "photo.png");
    assert_eq!(record.metadata["width"], json!(64));
    assert_eq!(record.metadata["height"], json!(48));
    assert_eq!(record.metadata["format"], json!("png"));
    assert!(record.metadata["size_bytes"].as_u64().unwrap() > 0);
    assert!(record.error.is_none());
    assert!(record.processed_at.is_some());
    assert!(record.duration >= 0.0);

    // Thumbnails are addressed by job id and size label.
    assert!(harness
        .thumbnails_dir
        .join(format!("{}_small.jpg", id))
        .exists());
    assert!(harness
        .thumbnails_dir
        .join(format!("{}_medium.jpg", id))
        .exists());
}

#[test]
fn rejects_unsupported_upload_without_processing() {
    let harness = TestHarness::new();
    let path = harness.write_raw("notes.txt", b"just some text");

    let id = harness
        .controller
        .submit("notes.txt", &path, is_supported_image(&path))
        .unwrap();

    // Pre-flight rejection commits before submit returns.
    let record = harness.controller.job(&id).unwrap();
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error.as_deref(), Some("invalid file format"));
    assert_eq!(record.duration, 0.0);
    assert!(record.metadata.is_empty());

    // No thumbnails for rejected uploads.
    assert!(!harness
        .thumbnails_dir
        .join(format!("{}_small.jpg", id))
        .exists());
}

#[test]
fn corrupt_image_fails_with_reason() {
    let harness = TestHarness::new();
    // Claims to be a PNG, so it passes the pre-flight check and reaches
    // the processor, which must classify the decode failure.
    let path = harness.write_raw("broken.png", b"\x89PNG but not really");

    let id = harness
        .controller
        .submit("broken.png", &path, is_supported_image(&path))
        .unwrap();
    let record = harness.wait_terminal(&id);

    assert_eq!(record.status, JobStatus::Failed);
    assert!(record.error.is_some());
    assert!(record.processed_at.is_some());
}

#[test]
fn stats_reflect_mixed_outcomes() {
    let harness = TestHarness::new();

    let good_a = harness.write_png("a.png", 32, 32);
    let good_b = harness.write_png("b.png", 40, 20);
    let corrupt = harness.write_raw("c.png", b"not a png");
    let unsupported = harness.write_raw("d.txt", b"text");

    let mut ids = Vec::new();
    for (name, path) in [
        ("a.png", &good_a),
        ("b.png", &good_b),
        ("c.png", &corrupt),
        ("d.txt", &unsupported),
    ] {
        ids.push(
            harness
                .controller
                .submit(name, path, is_supported_image(path))
                .unwrap(),
        );
    }
    for id in &ids {
        harness.wait_terminal(id);
    }

    let stats = harness.controller.stats().unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.failed, 2);
    assert_eq!(stats.success_rate, "50.00%");
    assert!(stats.average_processing_time_seconds >= 0.0);
}

#[test]
fn listing_includes_every_submission() {
    let harness = TestHarness::new();

    let good = harness.write_png("a.png", 16, 16);
    let bad = harness.write_raw("b.txt", b"text");

    let ok_id = harness
        .controller
        .submit("a.png", &good, is_supported_image(&good))
        .unwrap();
    let bad_id = harness
        .controller
        .submit("b.txt", &bad, is_supported_image(&bad))
        .unwrap();
    harness.wait_terminal(&ok_id);

    let jobs = harness.controller.jobs().unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().any(|j| j.id == ok_id));
    assert!(jobs.iter().any(|j| j.id == bad_id));
}
