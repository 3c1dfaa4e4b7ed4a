//! EMA (Exponential Moving Average) indicator

use crate::common::math;

/// Calculate EMA for a specific period
///
/// Seeded with the first close and emitted for every bar, so the output is
/// as long as the input. Empty when there are fewer closes than the period.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    math::ema(closes, period)
}

