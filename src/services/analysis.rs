//! Indicator and signal queries over stored candles

use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::db::{MarketStore, StoreError};
use crate::indicators::compute_indicators;
use crate::metrics::Metrics;
use crate::models::{IndicatorSet, Interval, Signal, SignalBoard};
use crate::services::market_data::FundingRateProvider;
use crate::signals::{aggregate_signals, detect_signals};

/// Intervals scanned by the signal board when the caller names none.
pub const DEFAULT_BOARD_INTERVALS: [Interval; 4] = [
    Interval::FiveMinutes,
    Interval::FifteenMinutes,
    Interval::ThirtyMinutes,
    Interval::OneHour,
];

#[derive(Clone)]
pub struct MarketAnalyzer {
    store: Arc<dyn MarketStore>,
    funding: Option<Arc<dyn FundingRateProvider>>,
    metrics: Option<Arc<Metrics>>,
    config: EngineConfig,
}

impl MarketAnalyzer {
    pub fn new(store: Arc<dyn MarketStore>, config: EngineConfig) -> Self {
        Self {
            store,
            funding: None,
            metrics: None,
            config,
        }
    }

    pub fn with_funding(mut self, funding: Arc<dyn FundingRateProvider>) -> Self {
        self.funding = Some(funding);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &Arc<dyn MarketStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Latest funding rate, or `None` when no provider is set or it fails.
    pub async fn funding_rate(&self, symbol: &str) -> Option<f64> {
        let provider = self.funding.as_ref()?;
        match provider.latest_funding_rate(symbol).await {
            Ok(rate) => rate,
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Funding rate unavailable");
                None
            }
        }
    }

    /// Indicators over the latest `limit` candles; `None` on too little data.
    pub async fn indicators(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Option<IndicatorSet>, StoreError> {
        let funding = self.funding_rate(symbol).await;
        self.indicators_with_funding(symbol, interval, limit, funding)
            .await
    }

    async fn indicators_with_funding(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
        funding: Option<f64>,
    ) -> Result<Option<IndicatorSet>, StoreError> {
        let candles = self.store.recent_candles(symbol, interval, limit).await?;
        let set = compute_indicators(symbol, interval, &candles, &self.config.indicators);
        Ok(set.map(|set| match funding {
            Some(rate) => set.with_funding_rate(rate),
            None => set,
        }))
    }

    /// Signals firing now for one symbol and interval, strongest first.
    pub async fn signals(&self, symbol: &str, interval: Interval) -> Result<Vec<Signal>, StoreError> {
        let funding = self.funding_rate(symbol).await;
        self.signals_with_funding(symbol, interval, funding).await
    }

    async fn signals_with_funding(
        &self,
        symbol: &str,
        interval: Interval,
        funding: Option<f64>,
    ) -> Result<Vec<Signal>, StoreError> {
        let limit = self.config.indicators.default_limit;
        let Some(set) = self
            .indicators_with_funding(symbol, interval, limit, funding)
            .await?
        else {
            debug!(symbol = %symbol, interval = %interval, "No indicators, no signals");
            return Ok(Vec::new());
        };

        let signals = detect_signals(&set, &self.config.signals);
        if let Some(metrics) = &self.metrics {
            metrics.record_signals(&signals);
        }
        Ok(signals)
    }

    /// Signals across every symbol/interval pair, split by direction.
    ///
    /// Pairs whose store read fails are logged and skipped.
    pub async fn board(&self, symbols: &[String], intervals: &[Interval]) -> SignalBoard {
        let per_symbol = symbols.iter().map(|symbol| async move {
            let funding = self.funding_rate(symbol).await;
            let mut signals = Vec::new();
            for &interval in intervals {
                match self.signals_with_funding(symbol, interval, funding).await {
                    Ok(found) => signals.extend(found),
                    Err(e) => {
                        warn!(symbol = %symbol, interval = %interval, error = %e, "Skipping signals");
                    }
                }
            }
            signals
        });

        let signals: Vec<Signal> = join_all(per_symbol).await.into_iter().flatten().collect();
        aggregate_signals(signals, Utc::now())
    }

    pub async fn top(&self, symbols: &[String], intervals: &[Interval], n: usize) -> Vec<Signal> {
        self.board(symbols, intervals).await.top(n)
    }
}
