//! Grayscale conversion.
//!
//! Collapses a decoded RGB image into the single-channel intensity grid
//! the filters operate on, using ITU-R BT.601 luma coefficients.

use image::RgbImage;

/// ITU-R BT.601 luma coefficients
const LUMA_R: f64 = 0.2989;
const LUMA_G: f64 = 0.5870;
const LUMA_B: f64 = 0.1140;

/// Convert an RGB image to a grayscale intensity grid (luminosity method).
///
/// Each pixel becomes `0.2989*R + 0.5870*G + 0.1140*B`, truncated to an
/// integer. Output is row-major with the same height and width as the input.
pub fn rgb_to_gray(img: &RgbImage) -> Vec<Vec<i64>> {
    let (width, height) = img.dimensions();
    let mut rows = Vec::with_capacity(height as usize);

    for y in 0..height {
        let mut row = Vec::with_capacity(width as usize);
        for x in 0..width {
            let image::Rgb([r, g, b]) = *img.get_pixel(x, y);
            let gray = LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64;
            row.push(gray as i64);
        }
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn single_pixel(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(1, 1, Rgb([r, g, b]))
    }

    #[test]
    fn test_red_weight() {
        let gray = rgb_to_gray(&single_pixel(255, 0, 0));
        // 0.2989 * 255 ≈ 76.2
        assert_eq!(gray[0][0], 76);
    }

    #[test]
    fn test_green_weight() {
        let gray = rgb_to_gray(&single_pixel(0, 255, 0));
        // 0.5870 * 255 ≈ 149.7
        assert_eq!(gray[0][0], 149);
    }

    #[test]
    fn test_blue_weight() {
        let gray = rgb_to_gray(&single_pixel(0, 0, 255));
        // 0.1140 * 255 ≈ 29.1
        assert_eq!(gray[0][0], 29);
    }

    #[test]
    fn test_white_is_near_full_intensity() {
        let gray = rgb_to_gray(&single_pixel(255, 255, 255));
        // Coefficients sum to 0.9999, so white lands just below 255.
        assert_eq!(gray[0][0], 254);
    }

    #[test]
    fn test_output_dimensions_match_input() {
        let img = RgbImage::from_fn(7, 3, |x, y| Rgb([x as u8, y as u8, 0]));
        let gray = rgb_to_gray(&img);
        assert_eq!(gray.len(), 3);
        assert!(gray.iter().all(|row| row.len() == 7));
    }
}
