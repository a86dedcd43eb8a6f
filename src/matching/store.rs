//! Learned color model storage and the learning-file loader
//!
//! Each model holds the color distributions observed across its training
//! samples. Loading is atomic per call: the learning file is parsed and
//! validated in full before the store is touched, so a malformed file
//! never corrupts an entry, including one already present under the same
//! name.
//!
//! # Learning file schema (version 1)
//!
//! ```json
//! {
//!   "version": 1,
//!   "model": "red_ball",
//!   "samples": [
//!     { "red": 0.9, "black": 0.1 },
//!     { "red": 0.85, "black": 0.15 }
//!   ]
//! }
//! ```
//!
//! Sample keys must belong to the color-name vocabulary; weights are
//! normalized on load.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MatchError, Result};
use crate::naming::distribution::ColorDistribution;

/// Version of the on-disk learning data schema
pub const LEARNING_SCHEMA_VERSION: u32 = 1;

/// On-disk learning file layout
#[derive(Debug, Serialize, Deserialize)]
struct LearningFile {
    version: u32,
    model: String,
    samples: Vec<ColorDistribution>,
}

/// How a load interacts with an existing entry of the same name
///
/// The caller chooses explicitly; there is no implicit default policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Accumulate the file's samples onto any existing entry
    Append,
    /// Discard any existing entry and keep only the file's samples
    Replace,
}

/// One learned object model: a name plus its training distributions
#[derive(Debug, Clone)]
pub struct ModelEntry {
    name: String,
    samples: Vec<ColorDistribution>,
}

impl ModelEntry {
    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Training distributions, in observation order
    pub fn samples(&self) -> &[ColorDistribution] {
        &self.samples
    }
}

/// Mapping from model name to its learned entry
///
/// Iteration follows lexical name order regardless of load order, which
/// keeps downstream ranking deterministic.
#[derive(Debug, Default)]
pub struct ModelStore {
    models: BTreeMap<String, ModelEntry>,
}

impl ModelStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no model has been loaded
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of models in the store
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Look up one model by name
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.models.get(name)
    }

    /// Iterate entries in lexical name order
    pub fn entries(&self) -> impl Iterator<Item = &ModelEntry> {
        self.models.values()
    }

    /// Append one training distribution under a model name
    ///
    /// Creates the entry when the name is new. This is the in-process
    /// learning path; file-based training goes through [`Self::load_model`].
    pub fn insert_sample(&mut self, name: &str, sample: ColorDistribution) {
        self.models
            .entry(name.to_string())
            .or_insert_with(|| ModelEntry {
                name: name.to_string(),
                samples: Vec::new(),
            })
            .samples
            .push(sample);
    }

    /// Load training distributions for one model from a learning file
    ///
    /// # Arguments
    ///
    /// * `name` - model name the caller expects; must match the file
    /// * `path` - learning file location
    /// * `mode` - explicit append-vs-replace policy for an existing entry
    ///
    /// # Returns
    ///
    /// The number of samples taken from the file.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::ModelLoadError` when the file is unreadable,
    /// fails to parse, carries an unsupported schema version or a
    /// mismatched model name, or contains no valid samples. On error the
    /// store is left exactly as it was, for this model and every other.
    pub fn load_model(&mut self, name: &str, path: &Path, mode: LoadMode) -> Result<usize> {
        let raw = fs::read_to_string(path).map_err(|e| {
            MatchError::model_load(name, format!("cannot read '{}'", path.display()), e)
        })?;

        let file: LearningFile = serde_json::from_str(&raw)
            .map_err(|e| MatchError::model_load(name, "malformed learning data", e))?;

        if file.version != LEARNING_SCHEMA_VERSION {
            return Err(MatchError::model_load_msg(
                name,
                format!(
                    "unsupported schema version {} (expected {})",
                    file.version, LEARNING_SCHEMA_VERSION
                ),
            ));
        }
        if file.model != name {
            return Err(MatchError::model_load_msg(
                name,
                format!("file describes model '{}'", file.model),
            ));
        }
        if file.samples.is_empty() {
            return Err(MatchError::model_load_msg(name, "learning file has no samples"));
        }

        // validation complete; only now mutate the store
        let count = file.samples.len();
        match mode {
            LoadMode::Append => {
                for sample in file.samples {
                    self.insert_sample(name, sample);
                }
            }
            LoadMode::Replace => {
                self.models.insert(
                    name.to_string(),
                    ModelEntry {
                        name: name.to_string(),
                        samples: file.samples,
                    },
                );
            }
        }

        info!(model = name, samples = count, ?mode, "loaded color model");
        Ok(count)
    }
}
