//! Hypothesis ranking of an observed distribution against learned models
//!
//! Scores every model in the store against the observed region
//! distribution:
//! - Per-sample similarity is the histogram intersection of the two
//!   distributions (symmetric, bounded to [0, 1])
//! - A model's score is the arithmetic mean over its training samples,
//!   so models with more samples gain no advantage
//! - Models are visited in lexical name order; on equal scores the
//!   earlier name wins, independent of load order
//!
//! Algorithm tag: `algo-histogram-intersection-ranking`

use std::collections::BTreeMap;

use tracing::debug;

use crate::matching::store::ModelStore;
use crate::naming::distribution::ColorDistribution;

/// Per-model similarity ranking for one observed region
#[derive(Debug, Clone)]
pub struct Hypothesis {
    scores: BTreeMap<String, f64>,
    best_label: String,
    best_score: f64,
}

impl Hypothesis {
    /// All model scores, keyed by model name in lexical order
    pub fn scores(&self) -> &BTreeMap<String, f64> {
        &self.scores
    }

    /// The arg-max model name
    pub fn best_label(&self) -> &str {
        &self.best_label
    }

    /// Score of the arg-max model
    pub fn best_score(&self) -> f64 {
        self.best_score
    }
}

/// Ranks observed distributions against a model store
#[derive(Debug, Default)]
pub struct HypothesisEngine;

impl HypothesisEngine {
    /// Create a hypothesis engine
    pub fn new() -> Self {
        Self
    }

    /// Rank every stored model against an observed distribution
    ///
    /// Returns `None` ("no hypothesis") when the store is empty or no
    /// model carries any training sample. Deterministic: identical
    /// observation and store state always yield the same ranking and the
    /// same tie-break outcome.
    pub fn rank(&self, observed: &ColorDistribution, store: &ModelStore) -> Option<Hypothesis> {
        let mut scores = BTreeMap::new();
        let mut best: Option<(String, f64)> = None;

        for entry in store.entries() {
            if entry.samples().is_empty() {
                continue;
            }
            let total: f64 = entry
                .samples()
                .iter()
                .map(|sample| observed.intersection(sample))
                .sum();
            let score = total / entry.samples().len() as f64;
            scores.insert(entry.name().to_string(), score);

            // strict comparison keeps the lexically earlier name on ties
            match &best {
                Some((_, best_score)) if score <= *best_score => {}
                _ => best = Some((entry.name().to_string(), score)),
            }
        }

        let (best_label, best_score) = best?;
        debug!(label = %best_label, score = best_score, models = scores.len(), "ranked hypothesis");
        Some(Hypothesis {
            scores,
            best_label,
            best_score,
        })
    }
}
