use perpscope::db::{InMemoryStore, MarketStore};
use perpscope::models::{Interval, Trade};

use crate::fixtures::{at, candle_at_close, minutes, series};

#[tokio::test]
async fn test_upsert_overwrites_by_key() {
    let store = InMemoryStore::new();
    let first = candle_at_close("BTC", Interval::FiveMinutes, at(10, 0), 100.0);
    let replacement = candle_at_close("BTC", Interval::FiveMinutes, at(10, 0), 105.0);

    store.upsert_candles(&[first]).await.unwrap();
    store.upsert_candles(&[replacement.clone()]).await.unwrap();

    assert_eq!(store.candle_count().await, 1);
    let stored = store
        .recent_candles("BTC", Interval::FiveMinutes, 10)
        .await
        .unwrap();
    assert_eq!(stored, vec![replacement]);
}

#[tokio::test]
async fn test_keys_include_symbol_and_interval() {
    let store = InMemoryStore::new();
    store
        .upsert_candles(&[
            candle_at_close("BTC", Interval::FiveMinutes, at(10, 0), 100.0),
            candle_at_close("ETH", Interval::FiveMinutes, at(10, 0), 10.0),
            candle_at_close("BTC", Interval::OneHour, at(10, 0), 100.0),
        ])
        .await
        .unwrap();

    assert_eq!(store.candle_count().await, 3);
    let eth = store
        .recent_candles("ETH", Interval::FiveMinutes, 10)
        .await
        .unwrap();
    assert_eq!(eth.len(), 1);
    assert_eq!(eth[0].close, 10.0);
}

#[tokio::test]
async fn test_candles_in_range_is_inclusive() {
    let store = InMemoryStore::new();
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    store
        .upsert_candles(&series("BTC", Interval::OneMinute, at(10, 0), &closes))
        .await
        .unwrap();

    let range = store
        .candles_in_range("BTC", Interval::OneMinute, at(10, 2), at(10, 5))
        .await
        .unwrap();
    let starts: Vec<_> = range.iter().map(|c| c.start_time).collect();
    assert_eq!(starts, vec![at(10, 2), at(10, 3), at(10, 4), at(10, 5)]);

    let inverted = store
        .candles_in_range("BTC", Interval::OneMinute, at(10, 5), at(10, 2))
        .await
        .unwrap();
    assert!(inverted.is_empty());
}

#[tokio::test]
async fn test_recent_candles_oldest_first() {
    let store = InMemoryStore::new();
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    store
        .upsert_candles(&series("BTC", Interval::OneMinute, at(10, 0), &closes))
        .await
        .unwrap();

    let recent = store
        .recent_candles("BTC", Interval::OneMinute, 3)
        .await
        .unwrap();
    let starts: Vec<_> = recent.iter().map(|c| c.start_time).collect();
    assert_eq!(starts, vec![at(10, 7), at(10, 8), at(10, 9)]);

    let none = store
        .recent_candles("SOL", Interval::OneMinute, 3)
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_recent_trades_sorted_and_limited() {
    let store = InMemoryStore::new();
    store
        .insert_trades(&[
            Trade::new("BTC", 101.0, at(10, 0) + minutes(2)),
            Trade::new("BTC", 100.0, at(10, 0)),
            Trade::new("ETH", 10.0, at(10, 0)),
            Trade::new("BTC", 102.0, at(10, 0) + minutes(1)),
        ])
        .await
        .unwrap();

    let trades = store.recent_trades("BTC", 2).await.unwrap();
    let prices: Vec<f64> = trades.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![102.0, 101.0]);

    assert_eq!(store.recent_trades("ETH", 10).await.unwrap().len(), 1);
    assert!(store.recent_trades("SOL", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_trades_in_range_is_inclusive() {
    let store = InMemoryStore::new();
    let trades: Vec<Trade> = (0..5)
        .map(|i| Trade::new("BTC", 100.0 + i as f64, at(10, 0) + minutes(i)))
        .collect();
    store.insert_trades(&trades).await.unwrap();

    let range = store.trades_in_range("BTC", at(10, 1), at(10, 3)).await.unwrap();
    let prices: Vec<f64> = range.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![101.0, 102.0, 103.0]);

    assert!(store
        .trades_in_range("BTC", at(10, 3), at(10, 1))
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .trades_in_range("ETH", at(10, 0), at(11, 0))
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_trade_capacity_evicts_oldest_per_symbol() {
    let store = InMemoryStore::with_trade_capacity(3);
    store
        .insert_trades(&[
            Trade::new("BTC", 103.0, at(10, 3)),
            Trade::new("BTC", 100.0, at(10, 0)),
            Trade::new("ETH", 10.0, at(10, 0)),
            Trade::new("BTC", 104.0, at(10, 4)),
        ])
        .await
        .unwrap();
    store
        .insert_trades(&[
            Trade::new("BTC", 101.0, at(10, 1)),
            Trade::new("BTC", 102.0, at(10, 2)),
        ])
        .await
        .unwrap();

    let btc = store.recent_trades("BTC", 10).await.unwrap();
    let prices: Vec<f64> = btc.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![102.0, 103.0, 104.0]);
    assert_eq!(store.recent_trades("ETH", 10).await.unwrap().len(), 1);
}
