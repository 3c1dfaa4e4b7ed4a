//! Bootstrapping base candles straight from trades.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::{Candle, Interval, Trade};
use crate::resample::validation::retain_valid_trades;

/// Bucket trades into 1m candles.
///
/// Open and close are the first and last trade prices of the minute, high
/// and low the extremes, and volume the number of trades (tick payloads do
/// not always carry a size). Only meant to seed the base interval before
/// regular candles exist.
pub fn candles_from_trades(trades: &[Trade]) -> Vec<Candle> {
    let interval = Interval::BASE;
    let mut trades = retain_valid_trades(trades);
    trades.sort_by_key(|t| t.timestamp);

    let mut buckets: BTreeMap<(String, DateTime<Utc>), Candle> = BTreeMap::new();
    for trade in &trades {
        let start = interval.window_start(trade.timestamp);
        buckets
            .entry((trade.symbol.clone(), start))
            .and_modify(|candle| {
                candle.high = candle.high.max(trade.price);
                candle.low = candle.low.min(trade.price);
                candle.close = trade.price;
                candle.volume += 1.0;
            })
            .or_insert_with(|| {
                Candle::new(
                    trade.symbol.clone(),
                    interval,
                    start,
                    trade.price,
                    trade.price,
                    trade.price,
                    trade.price,
                    1.0,
                )
            });
    }

    buckets.into_values().collect()
}
