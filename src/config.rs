//! Configuration for the color matcher
//!
//! All tunable parameters of the matching pipeline, organized into
//! sections for mask refinement, region sampling, and scoring.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed
//! programmatically:
//!
//! ```no_run
//! use match_colors::MatcherConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = MatcherConfig::from_json_file(Path::new("matcher.json"))?;
//!
//! // Or use defaults
//! let config = MatcherConfig::default();
//! # Ok::<(), match_colors::MatchError>(())
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{refinement, sampling, scoring};
use crate::error::{MatchError, Result};

/// Complete matcher configuration
///
/// Serializable to/from JSON for reproducible deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Location of the color name table resource
    pub color_table_path: PathBuf,

    /// Minimum hypothesis score for a positive classification
    pub confidence_threshold: f64,

    /// Write per-call debug artifacts (refined masks) to the debug folder
    #[serde(default)]
    pub debug_mode: bool,

    /// Destination directory for debug artifacts
    #[serde(default = "default_debug_folder")]
    pub debug_folder: PathBuf,

    /// Mask refinement parameters
    #[serde(default)]
    pub refinement: RefinementConfig,

    /// Region sampling parameters
    #[serde(default)]
    pub sampling: SamplingConfig,
}

/// Mask refinement parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementConfig {
    /// Contour erosion radius in pixels (0 disables refinement)
    pub erosion_radius: u32,

    /// Mask value at or above which a pixel counts as foreground
    pub foreground_threshold: u8,
}

/// Region sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Sampling stride in pixels (1 = every pixel); larger strides trade
    /// accuracy for speed
    pub stride: u32,
}

fn default_debug_folder() -> PathBuf {
    PathBuf::from("/tmp/match_colors_debug")
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            erosion_radius: refinement::DEFAULT_EROSION_RADIUS,
            foreground_threshold: refinement::DEFAULT_FOREGROUND_THRESHOLD,
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            stride: sampling::DEFAULT_STRIDE,
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            color_table_path: PathBuf::from("resources/color_names.txt"),
            confidence_threshold: scoring::DEFAULT_CONFIDENCE_THRESHOLD,
            debug_mode: false,
            debug_folder: default_debug_folder(),
            refinement: RefinementConfig::default(),
            sampling: SamplingConfig::default(),
        }
    }
}

impl MatcherConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `MatchError::ConfigError` when the file is unreadable,
    /// fails to parse, or carries an out-of-range threshold. Treated as
    /// fatal: a matcher cannot be constructed without valid configuration.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MatchError::config(format!("cannot read '{}'", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MatchError::config(format!("malformed '{}'", path.display()), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MatchError::config("serialization failed", e))?;
        std::fs::write(path, json)
            .map_err(|e| MatchError::config(format!("cannot write '{}'", path.display()), e))?;
        Ok(())
    }

    /// Validate value ranges
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MatchError::ConfigError {
                message: format!(
                    "confidence_threshold {} outside [0, 1]",
                    self.confidence_threshold
                ),
                source: None,
            });
        }
        if self.sampling.stride == 0 {
            return Err(MatchError::ConfigError {
                message: "sampling stride must be at least 1".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}
