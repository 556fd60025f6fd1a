use std::path::Path;

use filtersnap::config::AppConfig;
use filtersnap::detect::runner::{DetectError, DetectionJob, Detector};
use filtersnap::storage::{FsObjectStore, ObjectStore};
use image::{ImageBuffer, Rgb};
use tempfile::NamedTempFile;

/// Creates a 64x64 gradient test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(64, 64, |x, y| Rgb([(4 * x) as u8, (4 * y) as u8, 128u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Writes a class-name table with the given names and returns the temp file.
pub fn create_class_table(names: &[&str]) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp class table");
    let json = serde_json::json!({ "names": names });
    std::fs::write(file.path(), json.to_string()).expect("Failed to write class table");
    file
}

/// A prediction workspace rooted in a temp directory, with an AppConfig
/// pointing into it. Keep the returned TempDir alive for the test's duration.
pub fn create_test_workspace(bucket: &str) -> (AppConfig, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let config = AppConfig {
        bucket: bucket.to_string(),
        workspace: dir.path().join("workspace"),
        weights: dir.path().join("model.weights"),
        class_names_file: dir.path().join("classes.json"),
        db_file: dir.path().join("predictions.db"),
    };
    (config, dir)
}

/// Stand-in detector: copies the source image into the run directory and
/// writes a fixed label file, mimicking the layout of the real detector.
pub struct FakeDetector {
    /// Label lines to write; `None` skips the label file entirely,
    /// reproducing a run that found nothing to report.
    pub label_lines: Option<String>,
}

impl Detector for FakeDetector {
    fn detect(&self, job: &DetectionJob<'_>) -> Result<(), DetectError> {
        let run_dir = job.output_dir.join(job.run_id);
        let img_name = job
            .source
            .file_name()
            .expect("detection source must be a file");
        std::fs::create_dir_all(&run_dir).expect("Failed to create run dir");
        std::fs::copy(job.source, run_dir.join(img_name)).expect("Failed to copy annotated image");

        if let Some(lines) = &self.label_lines {
            let labels_dir = run_dir.join("labels");
            std::fs::create_dir_all(&labels_dir).expect("Failed to create labels dir");
            let stem = img_name
                .to_str()
                .and_then(|n| n.split('.').next())
                .expect("image name must be utf-8");
            std::fs::write(labels_dir.join(format!("{stem}.txt")), lines)
                .expect("Failed to write label file");
        }
        Ok(())
    }
}

/// Upload a local file into the store so a later predict call can find it.
pub async fn seed_object(store: &FsObjectStore, local: &Path, bucket: &str, key: &str) {
    store
        .upload(local, bucket, key)
        .await
        .expect("Failed to seed object store");
}
