//! The in-memory image filter engine.
//!
//! [`Img`] owns a rectangular grid of intensity values (rows of columns,
//! semantically 0-255) and applies each filter by replacing the grid in
//! place. An instance belongs to exactly one request context; filters are
//! pure grid transforms with no hidden state between calls.

pub mod error;
pub mod grayscale;
mod io;
pub mod steps;

use std::path::{Path, PathBuf};

use rand::Rng;

pub use error::{ConcatError, FilterError};

/// Default side length of the box-blur window.
pub const DEFAULT_BLUR_LEVEL: usize = 16;
/// Default probability of a cell turning to salt (255).
pub const DEFAULT_SALT_PROB: f64 = 0.05;
/// Default probability of a cell turning to pepper (0).
pub const DEFAULT_PEPPER_PROB: f64 = 0.05;

/// Concatenation axis for [`Img::concat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl std::str::FromStr for Direction {
    type Err = ConcatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal" => Ok(Direction::Horizontal),
            "vertical" => Ok(Direction::Vertical),
            other => Err(ConcatError::InvalidDirection(other.to_string())),
        }
    }
}

/// A single-channel image as a mutable intensity grid.
#[derive(Debug, Clone)]
pub struct Img {
    path: PathBuf,
    data: Vec<Vec<i64>>,
}

impl Img {
    /// Wrap an existing grid. The path is only used to derive the
    /// `_filtered` output name on save.
    pub fn from_grid<P: Into<PathBuf>>(path: P, data: Vec<Vec<i64>>) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &[Vec<i64>] {
        &self.data
    }

    pub fn height(&self) -> usize {
        self.data.len()
    }

    /// Width taken from the first row; rows are equal-length whenever the
    /// grid is in a valid state.
    pub fn width(&self) -> usize {
        self.data.first().map(|row| row.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0 || self.width() == 0
    }

    fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.data.iter().all(|row| row.len() == width)
    }

    /// Box-filter downsampling: each output cell is the floor mean of the
    /// `level x level` block at that offset. Output dimensions shrink to
    /// `(height - level + 1) x (width - level + 1)`.
    pub fn blur(&mut self, level: usize) -> Result<(), FilterError> {
        if self.is_empty() {
            return Err(FilterError::EmptyImage);
        }
        let height = self.height();
        let width = self.width();
        let max = height.min(width);
        if level == 0 || level > max {
            return Err(FilterError::InvalidBlurLevel {
                level,
                height,
                width,
                max,
            });
        }

        let filter_area = (level * level) as i64;
        let mut result = Vec::with_capacity(height - level + 1);
        for i in 0..=(height - level) {
            let mut row_result = Vec::with_capacity(width - level + 1);
            for j in 0..=(width - level) {
                let sum: i64 = self.data[i..i + level]
                    .iter()
                    .map(|row| row[j..j + level].iter().sum::<i64>())
                    .sum();
                row_result.push(sum.div_euclid(filter_area));
            }
            result.push(row_result);
        }

        self.data = result;
        debug_assert!(self.is_rectangular());
        Ok(())
    }

    /// Per-row absolute first difference; every row shrinks by one column.
    pub fn contour(&mut self) -> Result<(), FilterError> {
        if self.is_empty() {
            return Err(FilterError::EmptyImage);
        }
        let width = self.width();
        if width < 2 {
            return Err(FilterError::TooNarrow { width });
        }

        for row in &mut self.data {
            let mut res = Vec::with_capacity(row.len() - 1);
            for j in 1..row.len() {
                res.push((row[j - 1] - row[j]).abs());
            }
            *row = res;
        }

        debug_assert!(self.is_rectangular());
        Ok(())
    }

    /// Rotate 90 degrees clockwise: `rotated[j][i] = original[h-1-i][j]`.
    pub fn rotate(&mut self) -> Result<(), FilterError> {
        if self.is_empty() {
            return Err(FilterError::EmptyImage);
        }
        let height = self.height();
        let width = self.width();

        let mut rotated: Vec<Vec<i64>> = (0..width).map(|_| Vec::with_capacity(height)).collect();
        for row in self.data.iter().rev() {
            for (j, &value) in row.iter().enumerate() {
                rotated[j].push(value);
            }
        }

        self.data = rotated;
        debug_assert!(self.is_rectangular());
        Ok(())
    }

    /// Salt-and-pepper noise: per cell, one uniform draw in [0, 1) decides
    /// salt (255), pepper (0), or no change. The generator is supplied by
    /// the caller so tests can seed it; production passes `rand::rng()`.
    pub fn salt_n_pepper<R: Rng>(&mut self, rng: &mut R, salt_prob: f64, pepper_prob: f64) {
        for row in &mut self.data {
            for value in row.iter_mut() {
                let draw: f64 = rng.random();
                if draw < salt_prob {
                    *value = 255;
                } else if draw < salt_prob + pepper_prob {
                    *value = 0;
                }
            }
        }
    }

    /// Merge another image into this one along the given axis. Shape
    /// mismatches come back as a [`ConcatError`] so the request layer can
    /// report them without unwinding.
    pub fn concat(&mut self, other: &Img, direction: Direction) -> Result<(), ConcatError> {
        match direction {
            Direction::Horizontal => {
                if self.height() != other.height() {
                    return Err(ConcatError::HeightMismatch {
                        left: self.height(),
                        right: other.height(),
                    });
                }
                for (row, other_row) in self.data.iter_mut().zip(&other.data) {
                    row.extend_from_slice(other_row);
                }
            }
            Direction::Vertical => {
                if self.width() != other.width() {
                    return Err(ConcatError::WidthMismatch {
                        left: self.width(),
                        right: other.width(),
                    });
                }
                self.data.extend(other.data.iter().cloned());
            }
        }

        debug_assert!(self.is_rectangular());
        Ok(())
    }

    /// Global threshold binarization: cells at or above the grid-wide floor
    /// mean become 255, the rest 0.
    pub fn segment(&mut self) -> Result<(), FilterError> {
        if self.is_empty() {
            return Err(FilterError::EmptyImage);
        }

        let total: i64 = self.data.iter().map(|row| row.iter().sum::<i64>()).sum();
        let cells = (self.height() * self.width()) as i64;
        let average = total.div_euclid(cells);

        for row in &mut self.data {
            for value in row.iter_mut() {
                *value = if *value < average { 0 } else { 255 };
            }
        }

        Ok(())
    }
}
