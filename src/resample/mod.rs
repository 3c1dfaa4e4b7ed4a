//! Candle resampling: folds finer candles (or raw trades) into aligned
//! coarser windows.

pub mod aggregator;
pub mod trades;
pub mod validation;

pub use aggregator::*;
pub use trades::*;
pub use validation::*;
