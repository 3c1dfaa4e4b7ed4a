//! Exchange connectivity and the store-backed pipelines built on top of it.

pub mod aggregation;
pub mod analysis;
pub mod hyperliquid;
pub mod market_data;
