//! SMA (Simple Moving Average) indicator

use crate::common::math;

/// SMA over every window of `period` closes; empty if there are fewer
/// closes than the period.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    math::sma(closes, period)
}
