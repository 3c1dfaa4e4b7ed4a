//! Folding candles into coarser, UTC-aligned windows.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::warn;

use crate::models::{Candle, Interval};
use crate::resample::validation::retain_valid;

/// Resample `candles` into `target` windows.
///
/// Candles are grouped by symbol and by the start of the `target` window
/// containing their start time. Each non-empty group folds into one candle:
/// first open, last close, highest high, lowest low, summed volume. Windows
/// without input produce nothing. Output is ordered by symbol, then start
/// time, and depends only on the set of valid input candles.
///
/// Inputs coarser than `target` cannot be split and are dropped.
pub fn resample(candles: &[Candle], target: Interval) -> Vec<Candle> {
    let mut groups: BTreeMap<(String, DateTime<Utc>), Vec<Candle>> = BTreeMap::new();
    for candle in retain_valid(candles) {
        if candle.interval.minutes() > target.minutes() {
            warn!(
                symbol = %candle.symbol,
                interval = %candle.interval,
                target = %target,
                "Dropping candle coarser than resample target"
            );
            continue;
        }
        let window = target.window_start(candle.start_time);
        groups
            .entry((candle.symbol.clone(), window))
            .or_default()
            .push(candle);
    }

    groups
        .into_iter()
        .filter_map(|((symbol, start), group)| fold_window(&symbol, target, start, group))
        .collect()
}

/// Fold one window's constituents into a single candle.
pub fn fold_window(
    symbol: &str,
    interval: Interval,
    start: DateTime<Utc>,
    mut group: Vec<Candle>,
) -> Option<Candle> {
    group.sort_by_key(|c| c.start_time);
    let first = group.first()?;
    let last = group.last()?;

    let high = group.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let low = group.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let volume = group.iter().map(|c| c.volume).sum();

    Some(Candle::new(
        symbol,
        interval,
        start,
        first.open,
        high,
        low,
        last.close,
        volume,
    ))
}
