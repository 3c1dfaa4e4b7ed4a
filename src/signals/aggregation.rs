//! Merging signals across symbols and intervals.

use chrono::{DateTime, Utc};

use crate::models::signal::{Signal, SignalBoard};

/// Partition into bullish and bearish, each strongest first.
pub fn aggregate_signals(signals: Vec<Signal>, timestamp: DateTime<Utc>) -> SignalBoard {
    SignalBoard::from_signals(signals, timestamp)
}

/// Strongest `n` signals regardless of direction.
pub fn top_signals(signals: Vec<Signal>, n: usize, timestamp: DateTime<Utc>) -> Vec<Signal> {
    aggregate_signals(signals, timestamp).top(n)
}
