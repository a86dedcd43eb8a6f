//! Color naming: the lookup table and region distribution builder

pub mod distribution;
pub mod table;

pub use distribution::{ColorDistribution, DistributionBuilder};
pub use table::{ColorName, ColorNameTable};
