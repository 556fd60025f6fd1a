//! Label-file parsing for detection runs.
//!
//! A run writes one text file per image: one line per detected object,
//! whitespace-separated `class_index cx cy width height`, with the box
//! fields normalized to [0, 1]. Class indices resolve through a
//! [`ClassNames`] table loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::models::Label;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("Failed to read class names from {path:?}")]
    ClassTableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid class names file {path:?}")]
    ClassTableFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown class index {index} (table has {count} classes)")]
    UnknownClass { index: usize, count: usize },

    #[error("Malformed label line {line_no}: {line:?}")]
    MalformedLine { line_no: usize, line: String },

    #[error("Failed to read label file {path:?}")]
    LabelFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Index-to-name table for detection classes.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Load the table from a JSON file of the form `{"names": ["person", ...]}`.
    pub fn from_file(path: &Path) -> Result<Self, LabelError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LabelError::ClassTableRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| LabelError::ClassTableFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn resolve(&self, index: usize) -> Result<&str, LabelError> {
        self.names
            .get(index)
            .map(String::as_str)
            .ok_or(LabelError::UnknownClass {
                index,
                count: self.names.len(),
            })
    }
}

/// Parse the contents of a label file into resolved [`Label`] records.
/// Blank lines are skipped; anything else malformed is an error.
pub fn parse_label_file(contents: &str, names: &ClassNames) -> Result<Vec<Label>, LabelError> {
    let mut labels = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let malformed = || LabelError::MalformedLine {
            line_no: line_no + 1,
            line: line.to_string(),
        };

        if fields.len() != 5 {
            return Err(malformed());
        }

        let index: usize = fields[0].parse().map_err(|_| malformed())?;
        let cx: f64 = fields[1].parse().map_err(|_| malformed())?;
        let cy: f64 = fields[2].parse().map_err(|_| malformed())?;
        let width: f64 = fields[3].parse().map_err(|_| malformed())?;
        let height: f64 = fields[4].parse().map_err(|_| malformed())?;

        labels.push(Label {
            class: names.resolve(index)?.to_string(),
            cx,
            cy,
            width,
            height,
        });
    }

    Ok(labels)
}
