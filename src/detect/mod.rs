//! The prediction service: the full flow from an uploaded image name to a
//! stored [`PredictionSummary`].
//!
//! Each stage failure maps to its own [`PredictError`] variant so the
//! request layer can answer with the right status: a missing result is
//! not a storage outage, and a persistence failure is not a model bug.

pub mod labels;
pub mod runner;

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::db::PredictionRepository;
use crate::models::PredictionSummary;
use crate::storage::ObjectStore;
use labels::{ClassNames, LabelError};
use runner::{DetectError, DetectionJob, Detector};

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Failed to download {key} from bucket {bucket}: {cause}")]
    Download {
        bucket: String,
        key: String,
        cause: anyhow::Error,
    },

    #[error("Detection failed for {img_name}")]
    Detection {
        img_name: String,
        #[source]
        source: DetectError,
    },

    #[error("Failed to upload {key} to bucket {bucket}: {cause}")]
    Upload {
        bucket: String,
        key: String,
        cause: anyhow::Error,
    },

    #[error("Prediction {run_id}: result not found for {img_name}")]
    ResultNotFound { run_id: Uuid, img_name: String },

    #[error("Prediction {run_id}: invalid label output")]
    Labels {
        run_id: Uuid,
        #[source]
        source: LabelError,
    },

    #[error("Prediction {run_id}: failed to store summary: {cause}")]
    Persistence { run_id: Uuid, cause: anyhow::Error },
}

/// Drives one detection request end to end: download the original, run
/// the model, upload the annotated result, parse labels, persist the
/// summary document.
pub struct PredictService<S, D, R> {
    bucket: String,
    images_dir: PathBuf,
    runs_dir: PathBuf,
    weights: PathBuf,
    class_names: ClassNames,
    store: S,
    detector: D,
    repo: R,
}

impl<S, D, R> PredictService<S, D, R>
where
    S: ObjectStore,
    D: Detector,
    R: PredictionRepository,
{
    pub fn new(config: &AppConfig, class_names: ClassNames, store: S, detector: D, repo: R) -> Self {
        Self {
            bucket: config.bucket.clone(),
            images_dir: config.images_dir(),
            runs_dir: config.runs_dir(),
            weights: config.weights.clone(),
            class_names,
            store,
            detector,
            repo,
        }
    }

    pub async fn predict(&self, img_name: &str) -> Result<PredictionSummary, PredictError> {
        let prediction_id = Uuid::new_v4();
        let run_id = prediction_id.to_string();
        info!("Prediction {}: start processing {}", run_id, img_name);

        let original_img_path = self.images_dir.join(img_name);
        self.store
            .download(&self.bucket, img_name, &original_img_path)
            .await
            .map_err(|cause| PredictError::Download {
                bucket: self.bucket.clone(),
                key: img_name.to_string(),
                cause,
            })?;
        info!("Prediction {}: download completed", run_id);

        let job = DetectionJob {
            weights: &self.weights,
            source: &original_img_path,
            output_dir: &self.runs_dir,
            run_id: &run_id,
        };
        self.detector
            .detect(&job)
            .map_err(|source| PredictError::Detection {
                img_name: img_name.to_string(),
                source,
            })?;
        info!("Prediction {}: detection done", run_id);

        let run_dir = self.runs_dir.join(&run_id);
        let predicted_img_path = run_dir.join(img_name);
        let predicted_key = format!("{}/{}", run_id, img_name);
        self.store
            .upload(&predicted_img_path, &self.bucket, &predicted_key)
            .await
            .map_err(|cause| PredictError::Upload {
                bucket: self.bucket.clone(),
                key: predicted_key,
                cause,
            })?;

        let label_file = label_file_path(&run_dir, img_name);
        if !label_file.exists() {
            return Err(PredictError::ResultNotFound {
                run_id: prediction_id,
                img_name: img_name.to_string(),
            });
        }
        let contents = std::fs::read_to_string(&label_file).map_err(|source| {
            PredictError::Labels {
                run_id: prediction_id,
                source: LabelError::LabelFileRead {
                    path: label_file.clone(),
                    source,
                },
            }
        })?;
        let labels = labels::parse_label_file(&contents, &self.class_names).map_err(|source| {
            PredictError::Labels {
                run_id: prediction_id,
                source,
            }
        })?;

        let summary = PredictionSummary {
            prediction_id,
            original_img_path: original_img_path.display().to_string(),
            predicted_img_path: predicted_img_path.display().to_string(),
            labels,
            created_at: OffsetDateTime::now_utc(),
        };

        self.repo
            .add_prediction(&summary)
            .await
            .map_err(|cause| PredictError::Persistence {
                run_id: prediction_id,
                cause,
            })?;
        info!(
            "Prediction {}: summary stored with {} labels",
            run_id,
            summary.labels.len()
        );

        Ok(summary)
    }
}

/// Labels land at `<run_dir>/labels/<name up to the first dot>.txt`.
fn label_file_path(run_dir: &Path, img_name: &str) -> PathBuf {
    let stem = img_name.split('.').next().unwrap_or(img_name);
    run_dir.join("labels").join(format!("{stem}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_file_path_uses_first_dot_stem() {
        let dir = Path::new("/runs/abc");
        assert_eq!(
            label_file_path(dir, "photo.jpg"),
            PathBuf::from("/runs/abc/labels/photo.txt")
        );
        assert_eq!(
            label_file_path(dir, "photo.tag.jpg"),
            PathBuf::from("/runs/abc/labels/photo.txt")
        );
    }
}
