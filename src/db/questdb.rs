//! QuestDB database operations for candles and trades

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::{Client, NoTls, Row};
use tracing::warn;

use crate::config;
use crate::db::store::{MarketStore, StoreError};
use crate::models::{Candle, Interval, Trade};
use crate::resample::validation::warn_dropped_candle;

const CANDLE_COLUMNS: &str = "start_time, symbol, interval, open, high, low, close, volume";

pub struct QuestDatabase {
    client: Client,
}

impl QuestDatabase {
    pub async fn new() -> Result<Self, StoreError> {
        Self::connect(&config::get_questdb_url()).await
    }

    pub async fn connect(questdb_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(questdb_url, NoTls)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to QuestDB: {}", e)))?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "QuestDB connection error");
            }
        });

        let db = Self { client };

        db.init_schema().await?;

        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        let c = &self.client;

        // WAL tables with DEDUP UPSERT KEYS turn every insert on an existing
        // (start_time, symbol, interval) into an overwrite.
        c.execute(
            "CREATE TABLE IF NOT EXISTS candles (
                start_time TIMESTAMP,
                symbol SYMBOL,
                interval SYMBOL,
                open DOUBLE,
                high DOUBLE,
                low DOUBLE,
                close DOUBLE,
                volume DOUBLE
            ) TIMESTAMP(start_time) PARTITION BY DAY WAL
            DEDUP UPSERT KEYS(start_time, symbol, interval)",
            &[],
        )
        .await
        .map_err(|e| StoreError::Operation {
            operation: "create candles table",
            message: e.to_string(),
        })?;

        c.execute(
            "CREATE TABLE IF NOT EXISTS trades (
                timestamp TIMESTAMP,
                symbol SYMBOL,
                price DOUBLE
            ) TIMESTAMP(timestamp) PARTITION BY DAY WAL",
            &[],
        )
        .await
        .map_err(|e| StoreError::Operation {
            operation: "create trades table",
            message: e.to_string(),
        })?;

        Ok(())
    }

    fn decode_trade(row: &Row, symbol: &str) -> Option<Trade> {
        let timestamp: Option<NaiveDateTime> = row.try_get(0).ok().flatten();
        let price: Option<f64> = row.try_get(1).ok().flatten();
        match (timestamp, price) {
            (Some(ts), Some(price)) => Some(Trade::new(
                symbol,
                price,
                DateTime::from_naive_utc_and_offset(ts, Utc),
            )),
            _ => {
                warn!(symbol = %symbol, "Dropping trade row with missing timestamp or price");
                None
            }
        }
    }

    fn decode_candle(row: &Row, symbol: &str, interval: Interval) -> Option<Candle> {
        let start: Option<NaiveDateTime> = match row.try_get(0) {
            Ok(ts) => ts,
            Err(e) => {
                warn!(symbol = %symbol, interval = %interval, error = %e, "Dropping candle row with unreadable timestamp");
                return None;
            }
        };
        let Some(start) = start else {
            warn!(symbol = %symbol, interval = %interval, "Dropping candle row without timestamp");
            return None;
        };

        let price = |idx: usize| row.try_get::<_, Option<f64>>(idx).ok().flatten().unwrap_or(0.0);
        let candle = Candle::new(
            symbol,
            interval,
            DateTime::from_naive_utc_and_offset(start, Utc),
            price(3),
            price(4),
            price(5),
            price(6),
            price(7),
        );

        match candle.validate() {
            Ok(()) => Some(candle),
            Err(e) => {
                warn_dropped_candle(&candle, &e);
                None
            }
        }
    }
}

#[async_trait]
impl MarketStore for QuestDatabase {
    async fn upsert_candles(&self, candles: &[Candle]) -> Result<usize, StoreError> {
        let c = &self.client;

        let statement = format!(
            "INSERT INTO candles ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            CANDLE_COLUMNS
        );
        for candle in candles {
            // QuestDB expects timestamps - use NaiveDateTime for compatibility
            let start_naive = candle.start_time.naive_utc();
            c.execute(
                statement.as_str(),
                &[
                    &start_naive,
                    &candle.symbol,
                    &candle.interval.as_str(),
                    &candle.open,
                    &candle.high,
                    &candle.low,
                    &candle.close,
                    &candle.volume,
                ],
            )
            .await?;
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
        let c = &self.client;

        let query = format!(
            "SELECT {} FROM candles
             WHERE symbol = $1 AND interval = $2 AND start_time >= $3 AND start_time <= $4
             ORDER BY start_time ASC",
            CANDLE_COLUMNS
        );
        let rows = c
            .query(
                query.as_str(),
                &[&symbol, &interval.as_str(), &from.naive_utc(), &to.naive_utc()],
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| Self::decode_candle(row, symbol, interval))
            .collect())
    }

    async fn recent_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, StoreError> {
        let c = &self.client;

        let query = format!(
            "SELECT {} FROM candles
             WHERE symbol = $1 AND interval = $2
             ORDER BY start_time DESC
             LIMIT {}",
            CANDLE_COLUMNS, limit
        );
        let rows = c.query(query.as_str(), &[&symbol, &interval.as_str()]).await?;

        let mut candles: Vec<Candle> = rows
            .iter()
            .filter_map(|row| Self::decode_candle(row, symbol, interval))
            .collect();

        // Reverse to get oldest first
        candles.reverse();
        Ok(candles)
    }

    async fn insert_trades(&self, trades: &[Trade]) -> Result<usize, StoreError> {
        let c = &self.client;

        for trade in trades {
            c.execute(
                "INSERT INTO trades (timestamp, symbol, price) VALUES ($1, $2, $3)",
                &[&trade.timestamp.naive_utc(), &trade.symbol, &trade.price],
            )
            .await?;
        }

        Ok(trades.len())
    }

    async fn recent_trades(&self, symbol: &str, limit: usize) -> Result<Vec<Trade>, StoreError> {
        let c = &self.client;

        let query = format!(
            "SELECT timestamp, price FROM trades
             WHERE symbol = $1
             ORDER BY timestamp DESC
             LIMIT {}",
            limit
        );
        let rows = c.query(query.as_str(), &[&symbol]).await?;

        let mut trades: Vec<Trade> = rows
            .iter()
            .filter_map(|row| Self::decode_trade(row, symbol))
            .collect();

        trades.reverse();
        Ok(trades)
    }

    async fn trades_in_range(
        &self,
        symbol: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Trade>, StoreError> {
        let c = &self.client;

        let rows = c
            .query(
                "SELECT timestamp, price FROM trades
                 WHERE symbol = $1 AND timestamp >= $2 AND timestamp <= $3
                 ORDER BY timestamp ASC",
                &[&symbol, &from.naive_utc(), &to.naive_utc()],
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| Self::decode_trade(row, symbol))
            .collect())
    }
}
