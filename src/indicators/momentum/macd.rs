//! MACD (Moving Average Convergence Divergence) indicator

use crate::common::math;
use crate::indicators::trend::calculate_ema;
use crate::models::indicators::MacdSeries;

/// Calculate MACD indicator
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    if closes.len() < slow_period {
        return MacdSeries::default();
    }

    let fast_ema = calculate_ema(closes, fast_period);
    let slow_ema = calculate_ema(closes, slow_period);
    let macd = math::diff_aligned(&fast_ema, &slow_ema);
    let signal = calculate_ema(&macd, signal_period);
    let histogram = math::diff_aligned(&macd, &signal);

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, 12, 26, 9)
}
