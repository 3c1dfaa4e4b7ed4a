//! Row validation shared by every fold and store read.

use tracing::warn;

use crate::models::{Candle, CandleError, Trade};

/// Valid candles from `candles`; invalid ones are dropped with a warning.
pub fn retain_valid(candles: &[Candle]) -> Vec<Candle> {
    candles
        .iter()
        .filter(|candle| match candle.validate() {
            Ok(()) => true,
            Err(e) => {
                warn_dropped_candle(candle, &e);
                false
            }
        })
        .cloned()
        .collect()
}

pub fn warn_dropped_candle(candle: &Candle, error: &CandleError) {
    warn!(
        symbol = %candle.symbol,
        interval = %candle.interval,
        start_time = %candle.start_time,
        error = %error,
        "Dropping invalid candle"
    );
}

/// Trades with a positive, finite price.
pub fn retain_valid_trades(trades: &[Trade]) -> Vec<Trade> {
    trades
        .iter()
        .filter(|trade| {
            let valid = trade.price.is_finite() && trade.price > 0.0;
            if !valid {
                warn!(
                    symbol = %trade.symbol,
                    price = trade.price,
                    timestamp = %trade.timestamp,
                    "Dropping trade with invalid price"
                );
            }
            valid
        })
        .cloned()
        .collect()
}
