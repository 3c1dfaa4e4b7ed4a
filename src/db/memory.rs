//! In-process store, used when QuestDB is not reachable and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::db::store::{MarketStore, StoreError};
use crate::models::{Candle, Interval, Trade};

type CandleKey = (String, Interval, DateTime<Utc>);

/// Trades kept per symbol before the oldest are evicted.
pub const DEFAULT_TRADE_CAPACITY: usize = 100_000;

pub struct InMemoryStore {
    candles: RwLock<BTreeMap<CandleKey, Candle>>,
    trades: RwLock<HashMap<String, VecDeque<Trade>>>,
    trade_capacity: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::with_trade_capacity(DEFAULT_TRADE_CAPACITY)
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trade_capacity(trade_capacity: usize) -> Self {
        Self {
            candles: RwLock::new(BTreeMap::new()),
            trades: RwLock::new(HashMap::new()),
            trade_capacity: trade_capacity.max(1),
        }
    }

    pub async fn candle_count(&self) -> usize {
        self.candles.read().await.len()
    }
}

#[async_trait]
impl MarketStore for InMemoryStore {
    async fn upsert_candles(&self, candles: &[Candle]) -> Result<usize, StoreError> {
        let mut map = self.candles.write().await;
        for candle in candles {
            map.insert(candle.key(), candle.clone());
        }
        Ok(candles.len())
    }

    async fn candles_in_range(
        &self,
        symbol: &str,
        interval: Interval,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, StoreError> {
        if from > to {
            return Ok(Vec::new());
        }
        let map = self.candles.read().await;
        let lower = (symbol.to_string(), interval, from);
        let upper = (symbol.to_string(), interval, to);
        Ok(map.range(lower..=upper).map(|(_, c)| c.clone()).collect())
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        let map = self.candles.read().await;
        let mut candles: Vec<Candle> = map
            .values()
            .filter(|c| c.symbol == symbol && c.interval == interval)
            .rev()
            .take(limit)
            .cloned()
            .collect();
        candles.reverse();
        Ok(candles)
    }

    async fn insert_trades(&self, trades: &[Trade]) -> Result<usize, StoreError> {
        let mut map = self.trades.write().await;
        for trade in trades {
            let series = map.entry(trade.symbol.clone()).or_default();
            // Ticks mostly arrive in order, so this is usually a push_back.
            let at = series.partition_point(|t| t.timestamp <= trade.timestamp);
            series.insert(at, trade.clone());
            while series.len() > self.trade_capacity {
                series.pop_front();
            }
        }
        Ok(trades.len())
    }

    async fn recent_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>, StoreError> {
        let map = self.trades.read().await;
        let Some(trades) = map.get(symbol) else {
            return Ok(Vec::new());
        };
        let skip = trades.len().saturating_sub(limit);
        Ok(trades.iter().skip(skip).cloned().collect())
    }

    async fn trades_in_range(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        let map = self.trades.read().await;
        let Some(trades) = map.get(symbol) else {
            return Ok(Vec::new());
        };
        let start = trades.partition_point(|t| t.timestamp < from);
        Ok(trades
            .iter()
            .skip(start)
            .take_while(|t| t.timestamp <= to)
            .cloned()
            .collect())
    }
}
