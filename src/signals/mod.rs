//! Signal detection over indicator sets.

pub mod aggregation;
pub mod engine;
pub mod rules;
pub mod scoring;

pub use aggregation::*;
pub use engine::*;
pub use scoring::*;
