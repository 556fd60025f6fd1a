use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// One detected object: resolved class name plus a normalized bounding box
/// (center and size, all relative to image dimensions, in [0, 1]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub class: String,
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

/// The stored document for one completed detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub prediction_id: Uuid,
    pub original_img_path: String,
    pub predicted_img_path: String,
    pub labels: Vec<Label>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl PredictionSummary {
    /// Count detections per class, ordered by class name.
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.class.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Human-readable per-class summary, the text sent back to the user.
    pub fn summary_text(&self) -> String {
        let mut out = String::from("Prediction Summary:\n");
        for (class, count) in self.class_counts() {
            let mut chars = class.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            };
            out.push_str(&format!("{} - {}\n", capitalized, count));
        }
        out
    }
}
