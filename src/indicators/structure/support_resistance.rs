//! Support and Resistance levels detection

use crate::models::indicators::{Level, SupportResistance};
use crate::models::Candle;

/// Bars on each side a pivot must beat.
const PIVOT_WIDTH: usize = 2;

/// Find local minima (support) and maxima (resistance).
///
/// A bar is a support pivot when its low is strictly below the lows of the
/// two bars on either side; resistance mirrors that on highs. Each level's
/// strength counts the bars within `lookback` of the pivot whose high or low
/// sits within `tolerance` (relative) of the level.
pub fn calculate_support_resistance(
    candles: &[Candle],
    lookback: usize,
    tolerance: f64,
) -> SupportResistance {
    let mut levels = SupportResistance::default();
    if lookback == 0 || candles.len() < lookback || candles.len() < PIVOT_WIDTH * 2 + 1 {
        return levels;
    }

    for i in PIVOT_WIDTH..candles.len() - PIVOT_WIDTH {
        let neighbours = (i - PIVOT_WIDTH..=i + PIVOT_WIDTH).filter(|&j| j != i);
        let window_start = i.saturating_sub(lookback);
        let window_end = (i + lookback).min(candles.len());
        let window = &candles[window_start..window_end];

        let low = candles[i].low;
        if neighbours.clone().all(|j| low < candles[j].low) {
            levels.supports.push(Level {
                price: low,
                strength: level_strength(low, window, tolerance),
                time: candles[i].start_time,
            });
        }

        let high = candles[i].high;
        if neighbours.clone().all(|j| high > candles[j].high) {
            levels.resistances.push(Level {
                price: high,
                strength: level_strength(high, window, tolerance),
                time: candles[i].start_time,
            });
        }
    }

    levels
}

/// Number of candles whose high or low lies within `tolerance * level`.
pub fn level_strength(level: f64, candles: &[Candle], tolerance: f64) -> u32 {
    let band = level * tolerance;
    candles
        .iter()
        .filter(|c| (c.high - level).abs() <= band || (c.low - level).abs() <= band)
        .count() as u32
}

/// Calculate support/resistance with default lookback (50) and 0.1% tolerance
pub fn calculate_support_resistance_default(candles: &[Candle]) -> SupportResistance {
    calculate_support_resistance(candles, 50, 0.001)
}
