use perpscope::config::IndicatorSettings;
use perpscope::indicators::{compute_indicators, effective_period};
use perpscope::models::Interval;

use crate::fixtures::{at, ohlcv, rising_closes, series};

fn rising_candles(count: usize) -> Vec<perpscope::models::Candle> {
    series("BTC", Interval::OneHour, at(0, 0), &rising_closes(count))
}

#[test]
fn test_effective_period() {
    let settings = IndicatorSettings::default();
    assert_eq!(effective_period(20, 30, &settings), Some(20));
    assert_eq!(effective_period(50, 25, &settings), Some(25));
    assert_eq!(effective_period(50, 2, &settings), None);

    let strict = IndicatorSettings {
        adaptive: false,
        ..IndicatorSettings::default()
    };
    assert_eq!(effective_period(50, 25, &strict), None);
    assert_eq!(effective_period(20, 25, &strict), Some(20));
}

#[test]
fn test_compute_indicators_needs_min_candles() {
    let settings = IndicatorSettings::default();
    assert!(compute_indicators("BTC", Interval::OneHour, &[], &settings).is_none());
    assert!(compute_indicators("BTC", Interval::OneHour, &rising_candles(3), &settings).is_none());
    assert!(compute_indicators("BTC", Interval::OneHour, &rising_candles(19), &settings).is_none());
    assert!(compute_indicators("BTC", Interval::OneHour, &rising_candles(20), &settings).is_some());
}

#[test]
fn test_compute_indicators_values_for_short_uptrend() {
    let set = compute_indicators(
        "BTC",
        Interval::OneHour,
        &rising_candles(25),
        &IndicatorSettings::default(),
    )
    .unwrap();

    assert_eq!(set.symbol, "BTC");
    assert_eq!(set.interval, Interval::OneHour);
    assert_eq!(set.candle_count, 25);
    assert_eq!(set.current_price, 124.0);
    assert!((set.price_change_24h - (124.0 - 101.0) / 101.0 * 100.0).abs() < 1e-9);

    assert!((set.sma20.last().unwrap() - 114.5).abs() < 1e-9);
    assert_eq!(set.sma50.len(), 1);
    assert_eq!(set.rsi.len(), 11);
    assert_eq!(set.latest_rsi(), Some(100.0));
    assert_eq!(set.ema12.len(), 25);
    assert_eq!(set.vwap.len(), 25);
    assert_eq!(set.bollinger_bands.upper.len(), 6);
    assert!(!set.macd.histogram.is_empty());
    assert_eq!(set.funding_rate, None);

    assert_eq!(set.periods.rsi, Some(14));
    assert_eq!(set.periods.sma20, Some(20));
    assert_eq!(set.periods.sma50, Some(25));
    assert_eq!(set.periods.ema26, Some(25));
    assert_eq!(set.periods.macd, Some((12, 25, 9)));
    assert_eq!(set.periods.support_resistance, Some(25));
}

#[test]
fn test_compute_indicators_non_adaptive_leaves_gaps() {
    let settings = IndicatorSettings {
        adaptive: false,
        ..IndicatorSettings::default()
    };
    let set = compute_indicators("BTC", Interval::OneHour, &rising_candles(25), &settings).unwrap();

    assert_eq!(set.periods.sma50, None);
    assert_eq!(set.periods.macd, None);
    assert_eq!(set.periods.support_resistance, None);
    assert!(set.sma50.is_empty());
    assert!(set.ema26.is_empty());
    assert!(set.macd.macd.is_empty());
    assert_eq!(set.sma20.len(), 6);
}

#[test]
fn test_compute_indicators_sorts_and_validates_input() {
    let mut candles = rising_candles(21);
    candles.reverse();
    candles.push(ohlcv("BTC", Interval::OneHour, at(23, 0), 100.0, 90.0, 110.0, 100.0, 1.0));

    let set = compute_indicators("BTC", Interval::OneHour, &candles, &IndicatorSettings::default())
        .unwrap();
    assert_eq!(set.candle_count, 21);
    assert_eq!(set.current_price, 120.0);
}

#[test]
fn test_indicator_set_json_shape() {
    let set = compute_indicators(
        "ETH",
        Interval::FourHours,
        &rising_candles(30),
        &IndicatorSettings::default(),
    )
    .unwrap()
    .with_funding_rate(0.0001);

    let json = serde_json::to_value(&set).unwrap();
    assert_eq!(json["interval"], "4h");
    assert_eq!(json["fundingRate"], 0.0001);
    assert!(json.get("priceChange24h").is_some());
    assert!(json.get("bollingerBands").is_some());
    assert!(json.get("supportResistance").is_some());
    assert!(json["periods"].get("sma50").is_some());
}
