//! Computes the full indicator bundle for one symbol and interval.

use chrono::Utc;
use tracing::debug;

use crate::config::IndicatorSettings;
use crate::indicators::momentum::{calculate_macd, calculate_rsi};
use crate::indicators::structure::calculate_support_resistance;
use crate::indicators::trend::{calculate_ema, calculate_sma};
use crate::indicators::volatility::calculate_bollinger_bands;
use crate::indicators::volume::calculate_vwap;
use crate::models::indicators::{IndicatorPeriods, IndicatorSet, MacdSeries};
use crate::models::{Candle, Interval};
use crate::resample::validation::retain_valid;

pub const SMA_FAST_PERIOD: usize = 20;
pub const SMA_SLOW_PERIOD: usize = 50;
pub const EMA_FAST_PERIOD: usize = 12;
pub const EMA_SLOW_PERIOD: usize = 26;
pub const RSI_PERIOD: usize = 14;
pub const MACD_SIGNAL_PERIOD: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD_DEV: f64 = 2.0;
/// Bars back used for `price_change_24h`.
pub const PRICE_CHANGE_BARS: usize = 24;

/// Period to use when only `available` points exist.
///
/// The canonical period when the data covers it; otherwise, in adaptive
/// mode, the whole series as long as it reaches the configured floor.
pub fn effective_period(
    canonical: usize,
    available: usize,
    settings: &IndicatorSettings,
) -> Option<usize> {
    if available >= canonical {
        Some(canonical)
    } else if settings.adaptive && available >= settings.period_floor {
        Some(available)
    } else {
        None
    }
}

fn macd_periods(available: usize, settings: &IndicatorSettings) -> Option<(usize, usize, usize)> {
    let slow = effective_period(EMA_SLOW_PERIOD, available, settings)?;
    let fast = effective_period(EMA_FAST_PERIOD, available, settings)?.min(slow.saturating_sub(1));
    if fast < settings.period_floor.max(1) {
        return None;
    }
    let signal = effective_period(MACD_SIGNAL_PERIOD, available, settings)?;
    Some((fast, slow, signal))
}

/// Compute every indicator over `candles` (ascending by start time).
///
/// Returns `None` when fewer than `settings.min_candles` valid candles are
/// supplied. Series that cannot be computed even with a degraded period are
/// left empty and their entry in `periods` is `None`.
pub fn compute_indicators(
    symbol: &str,
    interval: Interval,
    candles: &[Candle],
    settings: &IndicatorSettings,
) -> Option<IndicatorSet> {
    let mut candles = retain_valid(candles);
    if candles.len() < settings.min_candles.max(1) {
        debug!(
            symbol = %symbol,
            interval = %interval,
            count = candles.len(),
            min = settings.min_candles,
            "Not enough candles for indicators"
        );
        return None;
    }
    candles.sort_by_key(|c| c.start_time);

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let len = closes.len();
    let current_price = closes[len - 1];
    let reference = closes[len.saturating_sub(PRICE_CHANGE_BARS)];
    let price_change_24h = (current_price - reference) / reference * 100.0;

    let periods = IndicatorPeriods {
        sma20: effective_period(SMA_FAST_PERIOD, len, settings),
        sma50: effective_period(SMA_SLOW_PERIOD, len, settings),
        ema12: effective_period(EMA_FAST_PERIOD, len, settings),
        ema26: effective_period(EMA_SLOW_PERIOD, len, settings),
        rsi: effective_period(RSI_PERIOD, len - 1, settings),
        macd: macd_periods(len, settings),
        bollinger: effective_period(BOLLINGER_PERIOD, len, settings),
        support_resistance: effective_period(
            settings.support_resistance_lookback,
            len,
            settings,
        ),
    };

    let series = |period: Option<usize>, f: &dyn Fn(usize) -> Vec<f64>| {
        period.map(f).unwrap_or_default()
    };

    let macd = periods
        .macd
        .map(|(fast, slow, signal)| calculate_macd(&closes, fast, slow, signal))
        .unwrap_or_else(MacdSeries::default);
    let bollinger_bands = periods
        .bollinger
        .map(|period| calculate_bollinger_bands(&closes, period, BOLLINGER_STD_DEV))
        .unwrap_or_default();
    let support_resistance = periods
        .support_resistance
        .map(|lookback| {
            calculate_support_resistance(&candles, lookback, settings.level_tolerance)
        })
        .unwrap_or_default();

    let set = IndicatorSet {
        symbol: symbol.to_string(),
        interval,
        as_of: Utc::now(),
        current_price,
        price_change_24h,
        candle_count: len,
        rsi: series(periods.rsi, &|p| calculate_rsi(&closes, p)),
        macd,
        bollinger_bands,
        sma20: series(periods.sma20, &|p| calculate_sma(&closes, p)),
        sma50: series(periods.sma50, &|p| calculate_sma(&closes, p)),
        ema12: series(periods.ema12, &|p| calculate_ema(&closes, p)),
        ema26: series(periods.ema26, &|p| calculate_ema(&closes, p)),
        vwap: calculate_vwap(&candles),
        support_resistance,
        periods,
        funding_rate: None,
    };

    debug!(
        symbol = %symbol,
        interval = %interval,
        count = len,
        "Calculated indicators"
    );
    Some(set)
}
