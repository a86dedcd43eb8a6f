//! # Match Colors
//!
//! A Rust crate for classifying the dominant color appearance of
//! segmented image regions against learned object color models.
//!
//! This library supports object recognition pipelines by:
//! - Mapping raw pixels to distributions over a closed color-name
//!   vocabulary through a quantized lookup table
//! - Refining segmentation masks to suppress contour-blur pixels
//! - Accumulating a normalized region distribution through the mask
//! - Ranking the observation against per-model learned distributions
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use image::{GrayImage, Luma, Rgb, RgbImage};
//! use match_colors::{
//!     Classification, Classify, ColorMatcher, ColorNameTable, MatcherConfig,
//! };
//!
//! let table = Arc::new(ColorNameTable::from_prototypes());
//! let matcher = ColorMatcher::with_table(MatcherConfig::default(), table);
//! matcher.train("red_ball", &RgbImage::from_pixel(32, 32, Rgb([250, 5, 5])),
//!     &GrayImage::from_pixel(32, 32, Luma([255])))?;
//!
//! let image = RgbImage::from_pixel(32, 32, Rgb([245, 10, 10]));
//! let mask = GrayImage::from_pixel(32, 32, Luma([255]));
//! match matcher.classify(&image, &mask)? {
//!     Classification::Match { label, score, .. } => println!("{label}: {score:.2}"),
//!     other => println!("no classification: {other:?}"),
//! }
//! # Ok::<(), match_colors::MatchError>(())
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use image::{GrayImage, RgbImage};
use tracing::{debug, warn};

pub mod config;
pub mod constants;
pub mod error;
pub mod mask;
pub mod matching;
pub mod naming;

pub use config::{MatcherConfig, RefinementConfig, SamplingConfig};
pub use error::{MatchError, Result};
pub use mask::MaskRefiner;
pub use matching::{Hypothesis, HypothesisEngine, LoadMode, ModelEntry, ModelStore};
pub use naming::{ColorDistribution, ColorName, ColorNameTable, DistributionBuilder};

/// Outcome of one classification call
///
/// Negative outcomes are ordinary results carrying their reason, not
/// errors; no default label is ever substituted.
#[derive(Debug, Clone)]
pub enum Classification {
    /// A model cleared the confidence threshold
    Match {
        /// Name of the best-matching model
        label: String,
        /// Aggregated similarity score of that model
        score: f64,
        /// Observed region distribution the decision was based on
        distribution: ColorDistribution,
    },
    /// The best model stayed below the confidence threshold
    BelowThreshold {
        /// Name of the best-matching model
        label: String,
        /// Its (insufficient) score
        score: f64,
    },
    /// The refined mask selected no pixels
    NoObservation,
    /// No loaded model was available to rank against
    NoHypothesis,
}

/// The single capability a host pipeline needs from this crate
///
/// An explicit seam in place of a plugin base class: implementors turn an
/// image and a segmentation mask into a labeled result.
pub trait Classify {
    /// Classify the masked region of an image
    fn classify(&self, image: &RgbImage, mask: &GrayImage) -> Result<Classification>;
}

/// Color matcher: refines, samples, and ranks one region per call
///
/// The color name table is injected at construction and shared read-only;
/// the model store sits behind a reader-writer lock so concurrent
/// classifications never block each other and model loading excludes only
/// writers for the duration of a validated append or replace.
#[derive(Debug)]
pub struct ColorMatcher {
    config: MatcherConfig,
    refiner: MaskRefiner,
    builder: DistributionBuilder,
    engine: HypothesisEngine,
    store: RwLock<ModelStore>,
    debug_sequence: AtomicU64,
}

impl ColorMatcher {
    /// Construct a matcher, loading the color name table from
    /// `config.color_table_path`
    ///
    /// # Errors
    ///
    /// Returns a fatal `MatchError::TableError` or
    /// `MatchError::ConfigError` when the table resource or the
    /// configuration is unusable; no classification can run without them.
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        let table = Arc::new(ColorNameTable::from_file(&config.color_table_path)?);
        Ok(Self::with_table(config, table))
    }

    /// Construct a matcher around an explicitly shared color name table
    ///
    /// The table is an immutable, injected dependency; several matchers
    /// may share one `Arc` without synchronization.
    pub fn with_table(config: MatcherConfig, table: Arc<ColorNameTable>) -> Self {
        let refiner = MaskRefiner::with_params(
            config.refinement.erosion_radius,
            config.refinement.foreground_threshold,
        );
        let builder = DistributionBuilder::with_stride(table, config.sampling.stride);
        Self {
            config,
            refiner,
            builder,
            engine: HypothesisEngine::new(),
            store: RwLock::new(ModelStore::new()),
            debug_sequence: AtomicU64::new(0),
        }
    }

    /// Load training distributions for one model from a learning file
    ///
    /// Serialized against concurrent classifications by the store's write
    /// lock; see [`ModelStore::load_model`] for schema and failure
    /// semantics.
    pub fn load_model(&self, name: &str, path: &Path, mode: LoadMode) -> Result<usize> {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .load_model(name, path, mode)
    }

    /// Learn one training observation for a model from an image and mask
    ///
    /// Runs the same refine-and-sample path as classification and appends
    /// the resulting distribution under `name`.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::DimensionMismatch` for mis-sized inputs and
    /// `MatchError::ModelLoadError` when the mask selects no pixels.
    pub fn train(&self, name: &str, image: &RgbImage, mask: &GrayImage) -> Result<()> {
        let refined = self.refiner.refine(mask);
        let observed = self.builder.build(image, &refined)?.ok_or_else(|| {
            MatchError::model_load_msg(name, "training mask selects no pixels")
        })?;
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_sample(name, observed);
        Ok(())
    }

    /// Model names currently loaded, in lexical order
    pub fn model_names(&self) -> Vec<String> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .map(|entry| entry.name().to_string())
            .collect()
    }

    fn dump_debug_mask(&self, refined: &GrayImage) {
        let sequence = self.debug_sequence.fetch_add(1, Ordering::Relaxed);
        let path = self
            .config
            .debug_folder
            .join(format!("refined_mask_{:06}.png", sequence));
        if let Err(e) = std::fs::create_dir_all(&self.config.debug_folder)
            .map_err(image::ImageError::IoError)
            .and_then(|_| refined.save(&path))
        {
            warn!(path = %path.display(), error = %e, "debug mask dump failed");
        }
    }
}

impl Classify for ColorMatcher {
    /// Classify the masked region of an image against the loaded models
    ///
    /// Runs mask refinement, distribution building, and hypothesis
    /// ranking, then applies the configured confidence threshold.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::DimensionMismatch` when image and mask sizes
    /// differ. Empty regions, empty stores, and sub-threshold scores are
    /// reported through [`Classification`], not as errors.
    fn classify(&self, image: &RgbImage, mask: &GrayImage) -> Result<Classification> {
        let refined = self.refiner.refine(mask);
        if self.config.debug_mode {
            self.dump_debug_mask(&refined);
        }

        let observed = match self.builder.build(image, &refined)? {
            Some(distribution) => distribution,
            None => {
                debug!("refined mask selects no pixels");
                return Ok(Classification::NoObservation);
            }
        };

        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let hypothesis = match self.engine.rank(&observed, &store) {
            Some(hypothesis) => hypothesis,
            None => {
                debug!("no models loaded, skipping ranking");
                return Ok(Classification::NoHypothesis);
            }
        };

        let label = hypothesis.best_label().to_string();
        let score = hypothesis.best_score();
        if score < self.config.confidence_threshold {
            debug!(
                label = %label,
                score,
                threshold = self.config.confidence_threshold,
                "best hypothesis below threshold"
            );
            return Ok(Classification::BelowThreshold { label, score });
        }

        Ok(Classification::Match {
            label,
            score,
            distribution: observed,
        })
    }
}
