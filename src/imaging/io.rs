//! Decode and encode boundary for [`Img`].
//!
//! The grid itself never touches files during filtering; it is built once
//! from a decoded color image and written back out once at the end.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{GrayImage, ImageReader, Luma};

use super::{Img, grayscale};

impl Img {
    /// Decode the image at `path` and convert it to a grayscale grid.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = ImageReader::open(path)
            .with_context(|| format!("Failed to open image {:?}", path))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {:?}: {}", path, e))?;

        let data = grayscale::rgb_to_gray(&decoded.to_rgb8());
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Write the current grid next to the original as
    /// `<stem>_filtered.<ext>` and return the new path.
    ///
    /// Intensities are mapped min-to-max onto the 0-255 range so filter
    /// outputs that exceed 8 bits (contour differences, raw sums) still
    /// encode; a constant grid writes as black.
    pub fn save(&self) -> Result<PathBuf> {
        let new_path = filtered_path(&self.path);
        self.save_to(&new_path)?;
        Ok(new_path)
    }

    /// Write the current grid to an arbitrary path (debug snapshots).
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            anyhow::bail!("Cannot save an empty image grid");
        }

        let lo = *self.data.iter().flatten().min().unwrap();
        let hi = *self.data.iter().flatten().max().unwrap();
        let range = hi - lo;

        let encoded = GrayImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let value = self.data[y as usize][x as usize];
            let scaled = if range > 0 {
                (value - lo) * 255 / range
            } else {
                0
            };
            Luma([scaled as u8])
        });

        encoded
            .save(path)
            .with_context(|| format!("Failed to save image {:?}", path))
    }
}

/// Derive the output name by inserting `_filtered` before the extension.
fn filtered_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_file_name(format!("{stem}_filtered.{ext}")),
        None => path.with_file_name(format!("{stem}_filtered")),
    }
}
