use async_trait::async_trait;
use perpscope::config::EngineConfig;
use perpscope::db::{InMemoryStore, MarketStore};
use perpscope::metrics::Metrics;
use perpscope::models::{Interval, SignalType};
use perpscope::services::analysis::MarketAnalyzer;
use perpscope::services::market_data::{FundingRateProvider, NoFundingRates};
use std::sync::Arc;

use crate::fixtures::{at, series, spike_down_closes};

struct FixedFunding(f64);

#[async_trait]
impl FundingRateProvider for FixedFunding {
    async fn latest_funding_rate(
        &self,
        _symbol: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Some(self.0))
    }
}

struct BrokenFunding;

#[async_trait]
impl FundingRateProvider for BrokenFunding {
    async fn latest_funding_rate(
        &self,
        _symbol: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Err("venue down".into())
    }
}

async fn seeded_store() -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store
        .upsert_candles(&series("BTC", Interval::OneHour, at(0, 0), &spike_down_closes()))
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_indicators_none_without_data() {
    let analyzer = MarketAnalyzer::new(Arc::new(InMemoryStore::new()), EngineConfig::default());
    let set = analyzer.indicators("BTC", Interval::OneHour, 100).await.unwrap();
    assert!(set.is_none());
    assert!(analyzer.signals("BTC", Interval::OneHour).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_indicators_include_funding_rate() {
    let analyzer = MarketAnalyzer::new(seeded_store().await, EngineConfig::default())
        .with_funding(Arc::new(FixedFunding(0.0003)));

    let set = analyzer
        .indicators("BTC", Interval::OneHour, 100)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(set.funding_rate, Some(0.0003));
    assert_eq!(set.candle_count, 20);
}

#[tokio::test]
async fn test_signals_with_extreme_funding() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let analyzer = MarketAnalyzer::new(seeded_store().await, EngineConfig::default())
        .with_funding(Arc::new(FixedFunding(0.02)))
        .with_metrics(metrics.clone());

    let signals = analyzer.signals("BTC", Interval::OneHour).await.unwrap();
    let types: Vec<SignalType> = signals.iter().map(|s| s.signal_type).collect();
    assert_eq!(
        types,
        vec![
            SignalType::RsiOversold,
            SignalType::ExtremeFundingBullish,
            SignalType::MacdBearishCrossover,
            SignalType::BbOversold,
        ]
    );

    let bullish = metrics
        .signals_detected_total
        .with_label_values(&["bullish"])
        .get();
    let bearish = metrics
        .signals_detected_total
        .with_label_values(&["bearish"])
        .get();
    assert_eq!(bullish, 3);
    assert_eq!(bearish, 1);
}

#[tokio::test]
async fn test_funding_failure_is_not_fatal() {
    let analyzer = MarketAnalyzer::new(seeded_store().await, EngineConfig::default())
        .with_funding(Arc::new(BrokenFunding));

    assert_eq!(analyzer.funding_rate("BTC").await, None);
    let signals = analyzer.signals("BTC", Interval::OneHour).await.unwrap();
    assert_eq!(signals.len(), 3);
}

#[tokio::test]
async fn test_no_funding_provider() {
    let analyzer = MarketAnalyzer::new(seeded_store().await, EngineConfig::default())
        .with_funding(Arc::new(NoFundingRates));
    assert_eq!(analyzer.funding_rate("BTC").await, None);
}

#[tokio::test]
async fn test_board_and_top_across_symbols() {
    let store = seeded_store().await;
    store
        .upsert_candles(&series("ETH", Interval::OneHour, at(0, 0), &spike_down_closes()))
        .await
        .unwrap();
    let analyzer = MarketAnalyzer::new(store, EngineConfig::default());
    let symbols = vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()];

    let board = analyzer
        .board(&symbols, &[Interval::OneHour, Interval::FiveMinutes])
        .await;
    assert_eq!(board.total, 6);
    assert_eq!(board.bullish.len(), 4);
    assert_eq!(board.bearish.len(), 2);
    assert!(board.bullish.windows(2).all(|w| w[0].strength >= w[1].strength));

    let top = analyzer.top(&symbols, &[Interval::OneHour], 2).await;
    assert_eq!(top.len(), 2);
    assert!(top.iter().all(|s| s.strength == 95.0 || s.strength == 90.0));
    assert_eq!(top[0].strength, 95.0);
}
