//! Storage interface used by the aggregation and analysis services.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Candle, Interval, Trade};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(#[from] tokio_postgres::Error),
    #[error("failed to {operation}: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

/// Candle and trade storage.
///
/// Candle writes are upserts keyed by `(symbol, interval, start_time)`, so
/// concurrent writers of the same aggregate never conflict. Reads return rows
/// ordered oldest first.
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Insert or overwrite each candle by key; returns the number written.
    async fn upsert_candles(&self, candles: &[Candle]) -> Result<usize, StoreError>;

    /// Candles with `from <= start_time <= to`.
    async fn candles_in_range(
        &self,
        symbol: &str,
        interval: Interval,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, StoreError>;

    /// The most recent `limit` candles.
    async fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError>;

    async fn insert_trades(&self, trades: &[Trade]) -> Result<usize, StoreError>;

    /// The most recent `limit` trades.
    async fn recent_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>, StoreError>;

    /// Trades with `from <= timestamp <= to`.
    async fn trades_in_range(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError>;
}
