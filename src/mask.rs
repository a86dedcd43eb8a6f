//! Segmentation mask refinement against contour blur
//!
//! Segmentation masks from upstream detectors include anti-aliased
//! boundary pixels whose colors mix object and background. Sampling them
//! biases the region distribution toward background hues, so the refiner
//! erodes the foreground set away from its contour before sampling:
//! - A pixel survives only when its whole square neighborhood is foreground
//! - Neighborhoods reaching past the image border count as background
//! - Surviving pixels keep their original mask weight
//!
//! Algorithm tag: `algo-contour-blur-erosion`

use image::GrayImage;

use crate::constants::refinement::{DEFAULT_EROSION_RADIUS, DEFAULT_FOREGROUND_THRESHOLD};

/// Refines raw segmentation masks by bounded foreground erosion
///
/// The refined mask's included set is always a subset of the input's;
/// radius 0 returns the input unchanged.
#[derive(Debug)]
pub struct MaskRefiner {
    erosion_radius: u32,
    foreground_threshold: u8,
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskRefiner {
    /// Create a refiner with default radius and foreground threshold
    pub fn new() -> Self {
        Self {
            erosion_radius: DEFAULT_EROSION_RADIUS,
            foreground_threshold: DEFAULT_FOREGROUND_THRESHOLD,
        }
    }

    /// Create a refiner with custom parameters
    pub fn with_params(erosion_radius: u32, foreground_threshold: u8) -> Self {
        Self {
            erosion_radius,
            foreground_threshold,
        }
    }

    /// Produce the refined mask for a raw segmentation mask
    ///
    /// Output dimensions equal input dimensions. Deterministic for
    /// identical input.
    pub fn refine(&self, mask: &GrayImage) -> GrayImage {
        if self.erosion_radius == 0 {
            return mask.clone();
        }

        let (width, height) = mask.dimensions();
        let mut refined = GrayImage::new(width, height);
        let radius = self.erosion_radius as i64;

        for y in 0..height {
            for x in 0..width {
                let value = mask.get_pixel(x, y).0[0];
                if value < self.foreground_threshold {
                    continue;
                }
                if self.neighborhood_is_foreground(mask, x as i64, y as i64, radius) {
                    refined.put_pixel(x, y, image::Luma([value]));
                }
            }
        }
        refined
    }

    fn neighborhood_is_foreground(&self, mask: &GrayImage, cx: i64, cy: i64, radius: i64) -> bool {
        let (width, height) = mask.dimensions();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let x = cx + dx;
                let y = cy + dy;
                if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                    return false;
                }
                if mask.get_pixel(x as u32, y as u32).0[0] < self.foreground_threshold {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn square_mask(size: u32, fg_from: u32, fg_to: u32) -> GrayImage {
        let mut mask = GrayImage::new(size, size);
        for y in fg_from..fg_to {
            for x in fg_from..fg_to {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
        mask
    }

    fn included_count(mask: &GrayImage) -> usize {
        mask.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn test_refiner_creation() {
        let refiner = MaskRefiner::new();
        assert_eq!(refiner.erosion_radius, DEFAULT_EROSION_RADIUS);
        assert_eq!(refiner.foreground_threshold, DEFAULT_FOREGROUND_THRESHOLD);
    }

    #[test]
    fn test_zero_radius_is_identity() {
        let mask = square_mask(10, 2, 8);
        let refined = MaskRefiner::with_params(0, 128).refine(&mask);
        assert_eq!(mask, refined);
    }

    #[test]
    fn test_erosion_shrinks_square() {
        let mask = square_mask(12, 2, 10);
        let refined = MaskRefiner::with_params(1, 128).refine(&mask);
        // 8x8 square erodes to 6x6
        assert_eq!(included_count(&mask), 64);
        assert_eq!(included_count(&refined), 36);
    }

    #[test]
    fn test_output_is_subset_of_input() {
        let mut mask = GrayImage::new(16, 16);
        // scattered blob with a ragged edge
        for y in 3..13 {
            for x in 3..13 {
                if (x + y) % 7 != 0 {
                    mask.put_pixel(x, y, Luma([200]));
                }
            }
        }
        let refined = MaskRefiner::new().refine(&mask);
        assert_eq!(mask.dimensions(), refined.dimensions());
        for (orig, out) in mask.pixels().zip(refined.pixels()) {
            if out.0[0] > 0 {
                assert_eq!(out.0[0], orig.0[0]);
            }
        }
        assert!(included_count(&refined) <= included_count(&mask));
    }

    #[test]
    fn test_border_foreground_is_eroded() {
        // foreground touching the border must not survive
        let mask = GrayImage::from_pixel(6, 6, Luma([255]));
        let refined = MaskRefiner::with_params(1, 128).refine(&mask);
        assert_eq!(included_count(&refined), 16);
        assert_eq!(refined.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_full_erosion_yields_empty_mask() {
        let mask = square_mask(8, 3, 5);
        let refined = MaskRefiner::with_params(2, 128).refine(&mask);
        assert_eq!(included_count(&refined), 0);
    }
}
