//! Job queue for candle aggregation

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use types::AggregateCandlesJob;
