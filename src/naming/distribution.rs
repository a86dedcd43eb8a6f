//! Color distributions and mask-weighted region sampling
//!
//! A [`ColorDistribution`] summarizes the appearance of a region as a
//! normalized weighting over the color-name vocabulary. The
//! [`DistributionBuilder`] produces one by sampling an image through a
//! (refined) mask and accumulating per-pixel table lookups.
//!
//! Algorithm tag: `algo-mask-weighted-color-accumulation`

use std::collections::BTreeMap;
use std::sync::Arc;

use image::{GrayImage, RgbImage};
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::sampling::DEFAULT_STRIDE;
use crate::error::{MatchError, Result};
use crate::naming::table::{ColorName, ColorNameTable};

/// Normalized weighting over the color-name vocabulary
///
/// Invariant: weights are non-negative and sum to 1.0 within tolerance.
/// There is no "empty" distribution value; APIs that can observe nothing
/// return `Option<ColorDistribution>` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorDistribution {
    weights: [f64; ColorName::COUNT],
}

impl ColorDistribution {
    /// Build a distribution from raw per-name weights, normalizing them
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidDistribution` when any weight is
    /// negative or non-finite, or when the weights sum to zero.
    pub fn from_weights(weights: [f64; ColorName::COUNT]) -> Result<Self> {
        let mut sum = 0.0;
        for w in &weights {
            if *w < 0.0 || !w.is_finite() {
                return Err(MatchError::InvalidDistribution {
                    context: "weight array".to_string(),
                    reason: format!("negative or non-finite weight {}", w),
                });
            }
            sum += w;
        }
        if sum <= 0.0 {
            return Err(MatchError::InvalidDistribution {
                context: "weight array".to_string(),
                reason: "weights sum to zero".to_string(),
            });
        }
        let mut normalized = weights;
        for w in &mut normalized {
            *w /= sum;
        }
        Ok(Self { weights: normalized })
    }

    /// Wrap weights that are already normalized (table cells)
    pub(crate) fn from_normalized(weights: [f64; ColorName::COUNT]) -> Self {
        Self { weights }
    }

    /// Weight assigned to one color name
    pub fn get(&self, name: ColorName) -> f64 {
        self.weights[name.index()]
    }

    /// Iterate `(name, weight)` pairs in vocabulary order
    pub fn iter(&self) -> impl Iterator<Item = (ColorName, f64)> + '_ {
        ColorName::ALL.iter().map(move |name| (*name, self.weights[name.index()]))
    }

    /// Sum of all weights (1.0 within tolerance for a valid distribution)
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Highest-weighted color name and its weight
    ///
    /// Ties keep the earlier name in vocabulary order, so the result is
    /// deterministic.
    pub fn dominant(&self) -> (ColorName, f64) {
        let mut best = (ColorName::ALL[0], self.weights[0]);
        for (name, weight) in self.iter() {
            if weight > best.1 {
                best = (name, weight);
            }
        }
        best
    }

    /// Histogram intersection with another distribution
    ///
    /// Symmetric, bounded to [0, 1]; 1.0 means identical distributions.
    pub fn intersection(&self, other: &ColorDistribution) -> f64 {
        self.weights
            .iter()
            .zip(&other.weights)
            .map(|(a, b)| a.min(*b))
            .sum()
    }
}

impl Serialize for ColorDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let nonzero = self.iter().filter(|(_, w)| *w > 0.0);
        let mut map = serializer.serialize_map(None)?;
        for (name, weight) in nonzero {
            map.serialize_entry(name.as_str(), &weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ColorDistribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut weights = [0.0f64; ColorName::COUNT];
        for (key, value) in raw {
            let name: ColorName = key.parse().map_err(D::Error::custom)?;
            weights[name.index()] = value;
        }
        ColorDistribution::from_weights(weights).map_err(D::Error::custom)
    }
}

/// Builds region color distributions by sampling through a mask
///
/// Sampling walks the image on a fixed stride and weights each sampled
/// pixel by its mask value, so weighted masks down-weight uncertain
/// pixels instead of excluding them outright. The stride trades accuracy
/// for speed and does not affect determinism.
#[derive(Debug)]
pub struct DistributionBuilder {
    table: Arc<ColorNameTable>,
    stride: u32,
}

impl DistributionBuilder {
    /// Create a builder over a shared color name table
    pub fn new(table: Arc<ColorNameTable>) -> Self {
        Self {
            table,
            stride: DEFAULT_STRIDE,
        }
    }

    /// Create a builder with a custom sampling stride (clamped to >= 1)
    pub fn with_stride(table: Arc<ColorNameTable>, stride: u32) -> Self {
        Self {
            table,
            stride: stride.max(1),
        }
    }

    /// Build the color-name distribution of the masked region
    ///
    /// # Arguments
    ///
    /// * `image` - RGB image containing the region
    /// * `mask` - co-sized membership mask; 0 excludes a pixel, any other
    ///   value weights it by `value / 255`
    ///
    /// # Returns
    ///
    /// `Ok(Some(distribution))` for a non-empty region, `Ok(None)` when
    /// the mask selects no pixels ("no observation").
    ///
    /// # Errors
    ///
    /// Returns `MatchError::DimensionMismatch` when image and mask sizes
    /// differ.
    pub fn build(&self, image: &RgbImage, mask: &GrayImage) -> Result<Option<ColorDistribution>> {
        let (width, height) = image.dimensions();
        if mask.dimensions() != (width, height) {
            return Err(MatchError::DimensionMismatch {
                image_width: width,
                image_height: height,
                mask_width: mask.width(),
                mask_height: mask.height(),
            });
        }

        let mut accumulated = [0.0f64; ColorName::COUNT];
        let mut total_weight = 0.0f64;

        let mut y = 0;
        while y < height {
            let mut x = 0;
            while x < width {
                let mask_value = mask.get_pixel(x, y).0[0];
                if mask_value > 0 {
                    let weight = mask_value as f64 / 255.0;
                    let pixel = image.get_pixel(x, y).0;
                    let dist = self.table.distribution_for(pixel);
                    for (name, w) in dist.iter() {
                        accumulated[name.index()] += weight * w;
                    }
                    total_weight += weight;
                }
                x += self.stride;
            }
            y += self.stride;
        }

        if total_weight <= 0.0 {
            return Ok(None);
        }
        for w in &mut accumulated {
            *w /= total_weight;
        }
        Ok(Some(ColorDistribution::from_normalized(accumulated)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::scoring::DISTRIBUTION_SUM_TOLERANCE;
    use image::{Luma, Rgb};

    fn weights_for(entries: &[(ColorName, f64)]) -> [f64; ColorName::COUNT] {
        let mut weights = [0.0; ColorName::COUNT];
        for (name, w) in entries {
            weights[name.index()] = *w;
        }
        weights
    }

    #[test]
    fn test_from_weights_normalizes() {
        let dist =
            ColorDistribution::from_weights(weights_for(&[(ColorName::Red, 3.0), (ColorName::Black, 1.0)]))
                .unwrap();
        assert!((dist.get(ColorName::Red) - 0.75).abs() < DISTRIBUTION_SUM_TOLERANCE);
        assert!((dist.sum() - 1.0).abs() < DISTRIBUTION_SUM_TOLERANCE);
    }

    #[test]
    fn test_from_weights_rejects_invalid() {
        assert!(ColorDistribution::from_weights(weights_for(&[(ColorName::Red, -1.0)])).is_err());
        assert!(ColorDistribution::from_weights([0.0; ColorName::COUNT]).is_err());
    }

    #[test]
    fn test_intersection_bounds() {
        let a = ColorDistribution::from_weights(weights_for(&[
            (ColorName::Red, 0.9),
            (ColorName::Black, 0.1),
        ]))
        .unwrap();
        let b = ColorDistribution::from_weights(weights_for(&[
            (ColorName::Red, 0.85),
            (ColorName::Black, 0.15),
        ]))
        .unwrap();
        let sim = a.intersection(&b);
        assert!((sim - 0.95).abs() < DISTRIBUTION_SUM_TOLERANCE);
        assert!((a.intersection(&a) - 1.0).abs() < DISTRIBUTION_SUM_TOLERANCE);
        // symmetric
        assert_eq!(sim, b.intersection(&a));

        let c = ColorDistribution::from_weights(weights_for(&[(ColorName::Blue, 1.0)])).unwrap();
        assert_eq!(a.intersection(&c), 0.0);
    }

    #[test]
    fn test_serde_round_trip() {
        let dist = ColorDistribution::from_weights(weights_for(&[
            (ColorName::Red, 0.9),
            (ColorName::Black, 0.1),
        ]))
        .unwrap();
        let json = serde_json::to_string(&dist).unwrap();
        let back: ColorDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(dist, back);
    }

    #[test]
    fn test_deserialize_rejects_unknown_name() {
        let result = serde_json::from_str::<ColorDistribution>(r#"{"magenta": 1.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_build_solid_region() {
        let table = Arc::new(ColorNameTable::from_prototypes());
        let builder = DistributionBuilder::with_stride(table, 1);

        let image = RgbImage::from_pixel(16, 16, Rgb([250, 5, 5]));
        let mask = GrayImage::from_pixel(16, 16, Luma([255]));

        let dist = builder.build(&image, &mask).unwrap().unwrap();
        assert_eq!(dist.dominant().0, ColorName::Red);
        assert!((dist.sum() - 1.0).abs() < DISTRIBUTION_SUM_TOLERANCE);
    }

    #[test]
    fn test_build_empty_mask_is_no_observation() {
        let table = Arc::new(ColorNameTable::from_prototypes());
        let builder = DistributionBuilder::new(table);

        let image = RgbImage::from_pixel(8, 8, Rgb([250, 5, 5]));
        let mask = GrayImage::from_pixel(8, 8, Luma([0]));

        assert!(builder.build(&image, &mask).unwrap().is_none());
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let table = Arc::new(ColorNameTable::from_prototypes());
        let builder = DistributionBuilder::new(table);

        let image = RgbImage::from_pixel(8, 8, Rgb([250, 5, 5]));
        let mask = GrayImage::from_pixel(4, 8, Luma([255]));

        assert!(matches!(
            builder.build(&image, &mask),
            Err(MatchError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_build_is_idempotent() {
        let table = Arc::new(ColorNameTable::from_prototypes());
        let builder = DistributionBuilder::new(table);

        let mut image = RgbImage::from_pixel(12, 12, Rgb([250, 5, 5]));
        for y in 0..12 {
            for x in 0..6 {
                image.put_pixel(x, y, Rgb([5, 5, 250]));
            }
        }
        let mask = GrayImage::from_pixel(12, 12, Luma([200]));

        let first = builder.build(&image, &mask).unwrap().unwrap();
        let second = builder.build(&image, &mask).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_weighted_mask_shifts_distribution() {
        let table = Arc::new(ColorNameTable::from_prototypes());
        let builder = DistributionBuilder::with_stride(table, 1);

        // left half red, right half blue; mask favors the red half
        let mut image = RgbImage::new(10, 2);
        let mut mask = GrayImage::new(10, 2);
        for y in 0..2 {
            for x in 0..10 {
                if x < 5 {
                    image.put_pixel(x, y, Rgb([250, 5, 5]));
                    mask.put_pixel(x, y, Luma([255]));
                } else {
                    image.put_pixel(x, y, Rgb([5, 5, 250]));
                    mask.put_pixel(x, y, Luma([64]));
                }
            }
        }

        let dist = builder.build(&image, &mask).unwrap().unwrap();
        assert!(dist.get(ColorName::Red) > dist.get(ColorName::Blue));
    }
}
