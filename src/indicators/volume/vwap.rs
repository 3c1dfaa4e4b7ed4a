//! VWAP (Volume Weighted Average Price)

use crate::models::Candle;

/// Cumulative VWAP from the first candle of the series.
///
/// Typical price is `(high + low + close) / 3`. Candles reporting no volume
/// are weighted as a single unit so the running average stays defined.
pub fn calculate_vwap(candles: &[Candle]) -> Vec<f64> {
    let mut cumulative_volume = 0.0;
    let mut cumulative_value = 0.0;

    candles
        .iter()
        .map(|candle| {
            let volume = if candle.volume > 0.0 { candle.volume } else { 1.0 };
            cumulative_value += candle.typical_price() * volume;
            cumulative_volume += volume;
            cumulative_value / cumulative_volume
        })
        .collect()
}
