use chrono::{Duration, Utc};
use perpscope::config::AggregationSettings;
use perpscope::db::{InMemoryStore, MarketStore};
use perpscope::models::{Interval, Trade};
use perpscope::services::aggregation::{aggregate_symbol, aggregate_symbols};

use crate::fixtures::{at, minutes, ohlcv, series};

fn two_hours_of_base(symbol: &str) -> Vec<perpscope::models::Candle> {
    let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i % 10) as f64).collect();
    series(symbol, Interval::OneMinute, at(10, 0), &closes)
}

#[tokio::test]
async fn test_aggregate_symbol_writes_every_target() {
    let store = InMemoryStore::new();
    store.upsert_candles(&two_hours_of_base("BTC")).await.unwrap();

    let report = aggregate_symbol(&store, "BTC", &AggregationSettings::default(), at(12, 0))
        .await
        .unwrap();

    assert_eq!(report.symbol, "BTC");
    assert_eq!(report.base_candles, 120);
    assert!(!report.bootstrapped_from_trades);
    assert_eq!(report.dropped_rows, 0);
    assert_eq!(
        report.upserted,
        vec![
            (Interval::FiveMinutes, 24),
            (Interval::FifteenMinutes, 8),
            (Interval::ThirtyMinutes, 4),
            (Interval::OneHour, 2),
            (Interval::FourHours, 1),
            (Interval::OneDay, 1),
        ]
    );
    assert_eq!(report.total_upserted(), 40);
    assert_eq!(store.candle_count().await, 160);

    let hourly = store.recent_candles("BTC", Interval::OneHour, 10).await.unwrap();
    assert_eq!(hourly.len(), 2);
    assert_eq!(hourly[0].start_time, at(10, 0));
    assert_eq!(hourly[0].volume, 600.0);
}

#[tokio::test]
async fn test_aggregate_symbol_is_idempotent() {
    let store = InMemoryStore::new();
    store.upsert_candles(&two_hours_of_base("BTC")).await.unwrap();
    let settings = AggregationSettings::default();

    aggregate_symbol(&store, "BTC", &settings, at(12, 0)).await.unwrap();
    let first = store.recent_candles("BTC", Interval::FiveMinutes, 100).await.unwrap();
    aggregate_symbol(&store, "BTC", &settings, at(12, 0)).await.unwrap();
    let second = store.recent_candles("BTC", Interval::FiveMinutes, 100).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.candle_count().await, 160);
}

#[tokio::test]
async fn test_aggregate_symbol_reads_whole_days_of_lookback() {
    let store = InMemoryStore::new();
    store.upsert_candles(&two_hours_of_base("BTC")).await.unwrap();
    let settings = AggregationSettings {
        lookback_hours: 1,
        ..AggregationSettings::default()
    };

    // 11:00 snaps back to midnight, so 10:00 through 11:59 are read.
    let report = aggregate_symbol(&store, "BTC", &settings, at(12, 0)).await.unwrap();
    assert_eq!(report.base_candles, 120);

    // The next day's pass no longer reaches back into 2024-01-01.
    let report = aggregate_symbol(&store, "BTC", &settings, at(12, 0) + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(report.base_candles, 0);
    assert!(report.upserted.is_empty());
}

#[tokio::test]
async fn test_aggregate_symbol_keeps_boundary_windows_complete() {
    let store = InMemoryStore::new();
    let closes: Vec<f64> = (0..1440).map(|i| 100.0 + (i % 10) as f64).collect();
    store
        .upsert_candles(&series("BTC", Interval::OneMinute, at(0, 0), &closes))
        .await
        .unwrap();
    let settings = AggregationSettings::default();
    let next_day = at(0, 0) + Duration::days(1);

    aggregate_symbol(&store, "BTC", &settings, next_day).await.unwrap();
    let daily = store.recent_candles("BTC", Interval::OneDay, 10).await.unwrap();
    let four_hour = store.recent_candles("BTC", Interval::FourHours, 10).await.unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].volume, 14400.0);
    assert_eq!(four_hour.len(), 6);
    assert_eq!(four_hour[1].start_time, at(4, 0));
    assert_eq!(four_hour[1].volume, 2400.0);

    // A later pass whose lookback starts mid-day must not shrink those windows.
    let later = next_day + Duration::hours(6) + Duration::seconds(30);
    aggregate_symbol(&store, "BTC", &settings, later).await.unwrap();
    assert_eq!(store.recent_candles("BTC", Interval::OneDay, 10).await.unwrap(), daily);
    assert_eq!(
        store.recent_candles("BTC", Interval::FourHours, 10).await.unwrap(),
        four_hour
    );
}

#[tokio::test]
async fn test_aggregate_symbol_bootstraps_from_trades() {
    let store = InMemoryStore::new();
    store
        .insert_trades(&[
            Trade::new("ETH", 10.0, at(11, 0) + Duration::seconds(1)),
            Trade::new("ETH", 11.0, at(11, 0) + Duration::seconds(30)),
            Trade::new("ETH", 12.0, at(11, 1) + Duration::seconds(10)),
        ])
        .await
        .unwrap();

    let report = aggregate_symbol(&store, "ETH", &AggregationSettings::default(), at(12, 0))
        .await
        .unwrap();

    assert!(report.bootstrapped_from_trades);
    assert_eq!(report.base_candles, 2);
    assert_eq!(report.upserted[0], (Interval::OneMinute, 2));

    let base = store.recent_candles("ETH", Interval::OneMinute, 10).await.unwrap();
    assert_eq!(base.len(), 2);
    assert_eq!(base[0].open, 10.0);
    assert_eq!(base[0].close, 11.0);

    let five = store.recent_candles("ETH", Interval::FiveMinutes, 10).await.unwrap();
    assert_eq!(five.len(), 1);
    assert_eq!(five[0].close, 12.0);
}

#[tokio::test]
async fn test_aggregate_symbol_folds_trades_after_bootstrap() {
    let store = InMemoryStore::new();
    let settings = AggregationSettings::default();
    store
        .insert_trades(&[
            Trade::new("ETH", 10.0, at(10, 0) + Duration::seconds(5)),
            Trade::new("ETH", 11.0, at(10, 1) + Duration::seconds(10)),
        ])
        .await
        .unwrap();
    let first = aggregate_symbol(&store, "ETH", &settings, at(10, 3)).await.unwrap();
    assert!(first.bootstrapped_from_trades);
    assert_eq!(first.upserted[0], (Interval::OneMinute, 2));

    store
        .insert_trades(&[
            Trade::new("ETH", 12.0, at(10, 5)),
            Trade::new("ETH", 13.0, at(10, 6)),
        ])
        .await
        .unwrap();
    let second = aggregate_symbol(&store, "ETH", &settings, at(10, 8)).await.unwrap();

    assert!(!second.bootstrapped_from_trades);
    // 10:01 is rebuilt along with the two new minutes.
    assert_eq!(second.upserted[0], (Interval::OneMinute, 3));
    assert_eq!(second.base_candles, 4);

    let base = store.recent_candles("ETH", Interval::OneMinute, 10).await.unwrap();
    let starts: Vec<_> = base.iter().map(|c| c.start_time).collect();
    assert_eq!(starts, vec![at(10, 0), at(10, 1), at(10, 5), at(10, 6)]);

    let five = store.recent_candles("ETH", Interval::FiveMinutes, 10).await.unwrap();
    assert_eq!(five.len(), 2);
    assert_eq!(five[1].start_time, at(10, 5));
    assert_eq!(five[1].open, 12.0);
    assert_eq!(five[1].close, 13.0);
    assert_eq!(five[1].volume, 2.0);
}

#[tokio::test]
async fn test_aggregate_symbol_without_data() {
    let store = InMemoryStore::new();
    let report = aggregate_symbol(&store, "SOL", &AggregationSettings::default(), at(12, 0))
        .await
        .unwrap();

    assert_eq!(report.base_candles, 0);
    assert!(report.upserted.is_empty());
    assert_eq!(store.candle_count().await, 0);
}

#[tokio::test]
async fn test_aggregate_symbol_counts_invalid_rows() {
    let store = InMemoryStore::new();
    let mut base = two_hours_of_base("BTC");
    base.push(ohlcv("BTC", Interval::OneMinute, at(11, 59), 0.0, 1.0, 0.0, 1.0, 1.0));
    // Replaces the valid 11:59 candle.
    store.upsert_candles(&base).await.unwrap();

    let report = aggregate_symbol(&store, "BTC", &AggregationSettings::default(), at(12, 0))
        .await
        .unwrap();
    assert_eq!(report.dropped_rows, 1);
    assert_eq!(report.base_candles, 119);
}

#[tokio::test]
async fn test_aggregate_symbols_runs_each_symbol() {
    let store = InMemoryStore::new();
    let start = Interval::OneMinute.window_start(Utc::now()) - minutes(10);
    let closes = vec![100.0; 5];
    store
        .upsert_candles(&series("BTC", Interval::OneMinute, start, &closes))
        .await
        .unwrap();
    store
        .upsert_candles(&series("ETH", Interval::OneMinute, start, &closes))
        .await
        .unwrap();

    let symbols = vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()];
    let reports = aggregate_symbols(&store, &symbols, &AggregationSettings::default()).await;

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].base_candles, 5);
    assert_eq!(reports[1].base_candles, 5);
    assert_eq!(reports[2].base_candles, 0);
}
