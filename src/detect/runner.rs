//! Invocation of the external detection model.
//!
//! The model itself is opaque: it takes weights, a source image and an
//! output directory, and leaves an annotated image plus label files in a
//! per-run subdirectory. [`CommandDetector`] drives a real external
//! program; tests substitute their own [`Detector`].

use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;
use thiserror::Error;

/// One detection invocation.
#[derive(Debug)]
pub struct DetectionJob<'a> {
    pub weights: &'a Path,
    pub source: &'a Path,
    pub output_dir: &'a Path,
    pub run_id: &'a str,
}

#[derive(Error, Debug)]
pub enum DetectError {
    #[error("Failed to launch detector {program:?}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Detector exited with {status}")]
    Failed { status: std::process::ExitStatus },
}

pub trait Detector {
    /// Run detection; on success the run directory
    /// `output_dir/run_id/` holds the annotated image and label files.
    fn detect(&self, job: &DetectionJob<'_>) -> Result<(), DetectError>;
}

/// Detector backed by an external command, invoked as
/// `program --weights W --source S --project OUT --name RUN_ID --save-txt`.
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: PathBuf,
}

impl CommandDetector {
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Detector for CommandDetector {
    fn detect(&self, job: &DetectionJob<'_>) -> Result<(), DetectError> {
        info!(
            "Running detector {:?} on {:?} (run {})",
            self.program, job.source, job.run_id
        );

        let status = Command::new(&self.program)
            .arg("--weights")
            .arg(job.weights)
            .arg("--source")
            .arg(job.source)
            .arg("--project")
            .arg(job.output_dir)
            .arg("--name")
            .arg(job.run_id)
            .arg("--save-txt")
            .status()
            .map_err(|source| DetectError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(DetectError::Failed { status });
        }
        Ok(())
    }
}
