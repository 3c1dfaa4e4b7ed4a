//! Technical indicators as free functions over price slices, plus the
//! engine that bundles them into an [`IndicatorSet`](crate::models::IndicatorSet).

pub mod engine;

pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use engine::*;
