use perpscope::config::{
    parse_symbol_list, AggregationSettings, EngineConfig, IndicatorSettings, SignalSettings,
};
use perpscope::logging::is_production;

#[test]
fn test_parse_symbol_list() {
    assert_eq!(
        parse_symbol_list(" eth, BTC ,,sol "),
        vec!["ETH".to_string(), "BTC".to_string(), "SOL".to_string()]
    );
    assert!(parse_symbol_list(" , ").is_empty());
}

#[test]
fn test_indicator_defaults() {
    let settings = IndicatorSettings::default();
    assert_eq!(settings.min_candles, 20);
    assert_eq!(settings.period_floor, 3);
    assert!(settings.adaptive);
    assert_eq!(settings.support_resistance_lookback, 50);
    assert_eq!(settings.level_tolerance, 0.001);
}

#[test]
fn test_signal_defaults() {
    let settings = SignalSettings::default();
    assert_eq!(settings.rsi_oversold, 35.0);
    assert_eq!(settings.rsi_overbought, 65.0);
    assert_eq!(settings.band_tolerance, 0.01);
    assert_eq!(settings.funding_extreme, 0.01);
}

#[test]
fn test_engine_config_bundles_defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.aggregation, AggregationSettings::default());
    assert_eq!(config.aggregation.lookback_hours, 24);
    assert_eq!(config.aggregation.schedule_interval_seconds, 60);
}

#[test]
fn test_is_production() {
    assert!(is_production("production"));
    assert!(is_production("prod"));
    assert!(!is_production("sandbox"));
}
