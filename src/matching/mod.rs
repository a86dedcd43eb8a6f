//! Model storage and hypothesis ranking

pub mod hypothesis;
pub mod store;

pub use hypothesis::{Hypothesis, HypothesisEngine};
pub use store::{LoadMode, ModelEntry, ModelStore, LEARNING_SCHEMA_VERSION};
