//! Fixed parameters of the color matching pipeline
//!
//! This module contains compile-time constants for the color-name lookup
//! table, mask refinement, region sampling, and hypothesis scoring.

/// Color name table quantization
///
/// The lookup table follows the layout of the van de Weijer color-name
/// model: each RGB channel is quantized into 32 bins of width 8, giving
/// 32768 cells, each holding a distribution over the 11 color names.
pub mod table {
    /// Number of bins per RGB channel
    pub const CHANNEL_BINS: usize = 32;

    /// Width of one quantization bin (256 / CHANNEL_BINS)
    pub const BIN_WIDTH: usize = 8;

    /// Total number of cells in the lookup table
    pub const CELL_COUNT: usize = CHANNEL_BINS * CHANNEL_BINS * CHANNEL_BINS;
}

/// Mask refinement parameters
pub mod refinement {
    /// Default erosion radius in pixels for contour-blur suppression
    pub const DEFAULT_EROSION_RADIUS: u32 = 2;

    /// Mask value at or above which a pixel counts as foreground
    pub const DEFAULT_FOREGROUND_THRESHOLD: u8 = 128;
}

/// Region sampling parameters
pub mod sampling {
    /// Default sampling stride in pixels (1 = every pixel)
    pub const DEFAULT_STRIDE: u32 = 2;
}

/// Hypothesis scoring parameters
pub mod scoring {
    /// Default confidence threshold for accepting a classification
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

    /// Tolerance used when validating that a distribution sums to one
    pub const DISTRIBUTION_SUM_TOLERANCE: f64 = 1e-6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_geometry() {
        assert_eq!(table::CHANNEL_BINS * table::BIN_WIDTH, 256);
        assert_eq!(
            table::CELL_COUNT,
            table::CHANNEL_BINS * table::CHANNEL_BINS * table::CHANNEL_BINS
        );
    }

    #[test]
    fn test_threshold_ranges() {
        assert!(scoring::DEFAULT_CONFIDENCE_THRESHOLD > 0.0);
        assert!(scoring::DEFAULT_CONFIDENCE_THRESHOLD <= 1.0);
        assert!(sampling::DEFAULT_STRIDE >= 1);
    }
}
