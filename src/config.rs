//! Application configuration, resolved once at startup.
//!
//! Nothing in the service reads the process environment after
//! construction; `main` builds one [`AppConfig`] from CLI arguments and
//! hands it down.

use std::path::PathBuf;

/// Configuration for the prediction service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bucket holding uploaded originals and annotated results.
    pub bucket: String,
    /// Working directory; originals land in `images/`, runs in `runs/`.
    pub workspace: PathBuf,
    /// Model weights handed to the detector.
    pub weights: PathBuf,
    /// JSON class-name table for resolving label indices.
    pub class_names_file: PathBuf,
    /// SQLite file for stored prediction summaries.
    pub db_file: PathBuf,
}

impl AppConfig {
    pub fn images_dir(&self) -> PathBuf {
        self.workspace.join("images")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.workspace.join("runs")
    }
}
