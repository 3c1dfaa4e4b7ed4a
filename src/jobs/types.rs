//! Job payloads pushed to the Redis queue

use serde::{Deserialize, Serialize};

/// Resample the recent 1m candles of one symbol into every coarser interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateCandlesJob {
    pub symbol: String,
}

impl AggregateCandlesJob {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}
