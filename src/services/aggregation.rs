//! Store-backed resampling passes

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::AggregationSettings;
use crate::db::{MarketStore, StoreError};
use crate::models::Interval;
use crate::resample::{candles_from_trades, resample, retain_valid};

/// Outcome of one aggregation pass for a symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationReport {
    pub symbol: String,
    pub base_candles: usize,
    /// No 1m candles were stored, so they were built from the latest trades.
    pub bootstrapped_from_trades: bool,
    pub dropped_rows: usize,
    pub upserted: Vec<(Interval, usize)>,
}

impl AggregationReport {
    pub fn total_upserted(&self) -> usize {
        self.upserted.iter().map(|(_, n)| n).sum()
    }
}

/// Resample the recent 1m candles of `symbol` into every target interval.
///
/// The read range starts at the UTC day containing `now - lookback_hours`,
/// so every window written is folded from all of its stored constituents.
/// Trades since the latest stored 1m candle are folded into 1m candles
/// first; with no 1m candles at all, the latest trades bootstrap them.
/// Re-running a pass over unchanged input rewrites the same rows.
pub async fn aggregate_symbol(
    store: &dyn MarketStore,
    symbol: &str,
    settings: &AggregationSettings,
    now: DateTime<Utc>,
) -> Result<AggregationReport, StoreError> {
    let from = Interval::OneDay.window_start(now - Duration::hours(settings.lookback_hours));
    let mut report = AggregationReport {
        symbol: symbol.to_string(),
        ..Default::default()
    };

    let latest = store.recent_candles(symbol, Interval::BASE, 1).await?.pop();
    let trades = match &latest {
        Some(candle) => {
            store
                .trades_in_range(symbol, candle.start_time.max(from), now)
                .await?
        }
        None => {
            store
                .recent_trades(symbol, settings.trade_fallback_limit)
                .await?
        }
    };

    if !trades.is_empty() {
        let from_trades = candles_from_trades(&trades);
        let written = store.upsert_candles(&from_trades).await?;
        report.bootstrapped_from_trades = latest.is_none();
        report.upserted.push((Interval::BASE, written));
        info!(
            symbol = %symbol,
            trades = trades.len(),
            candles = written,
            bootstrap = report.bootstrapped_from_trades,
            "Folded trades into 1m candles"
        );
    }

    let base = store
        .candles_in_range(symbol, Interval::BASE, from, now)
        .await?;
    if base.is_empty() {
        debug!(symbol = %symbol, "No candles or trades to aggregate");
        return Ok(report);
    }

    let valid = retain_valid(&base);
    report.dropped_rows += base.len() - valid.len();
    report.base_candles = valid.len();

    for target in Interval::targets() {
        let candles = resample(&valid, target);
        if candles.is_empty() {
            continue;
        }
        let written = store.upsert_candles(&candles).await?;
        report.upserted.push((target, written));
    }

    info!(
        symbol = %symbol,
        base_candles = report.base_candles,
        upserted = report.total_upserted(),
        "Aggregation complete"
    );
    Ok(report)
}

/// Run [`aggregate_symbol`] for every symbol concurrently.
///
/// A failing symbol is logged and left out of the result; the others still
/// complete.
pub async fn aggregate_symbols(
    store: &dyn MarketStore,
    symbols: &[String],
    settings: &AggregationSettings,
) -> Vec<AggregationReport> {
    let now = Utc::now();
    let runs = symbols
        .iter()
        .map(|symbol| aggregate_symbol(store, symbol, settings, now));

    join_all(runs)
        .await
        .into_iter()
        .zip(symbols)
        .filter_map(|(result, symbol)| match result {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Aggregation failed");
                None
            }
        })
        .collect()
}
