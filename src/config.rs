//! Environment-driven configuration.
//!
//! Every binary calls `dotenvy::dotenv()` first, so values can come from a
//! `.env` file as well as the process environment.

use std::env;
use std::str::FromStr;

pub const DEFAULT_SYMBOLS: [&str; 3] = ["ETH", "BTC", "SOL"];

pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_questdb_url() -> String {
    env::var("QUESTDB_URL").unwrap_or_else(|_| {
        "host=localhost port=8812 user=admin password=quest dbname=qdb".to_string()
    })
}

pub fn get_redis_url() -> String {
    env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string())
}

pub fn get_hyperliquid_ws_url() -> String {
    env::var("HYPERLIQUID_WS_URL").unwrap_or_else(|_| "wss://api.hyperliquid.xyz/ws".to_string())
}

pub fn get_hyperliquid_api_url() -> String {
    env::var("HYPERLIQUID_API_URL").unwrap_or_else(|_| "https://api.hyperliquid.xyz".to_string())
}

/// Symbols from `SYMBOLS` (comma separated), falling back to ETH, BTC, SOL.
pub fn get_symbols() -> Vec<String> {
    env::var("SYMBOLS")
        .ok()
        .map(|raw| parse_symbol_list(&raw))
        .filter(|symbols| !symbols.is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
}

/// Split a comma separated list, trimming blanks and upper-casing entries.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Thresholds for the indicator engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    /// Below this many candles no indicator set is produced.
    pub min_candles: usize,
    /// Smallest period the engine may fall back to when data is thin.
    pub period_floor: usize,
    /// Substitute shorter periods when the series is shorter than canonical.
    pub adaptive: bool,
    /// Candles requested from the store per indicator computation.
    pub default_limit: usize,
    pub support_resistance_lookback: usize,
    /// Relative distance counted as a touch of a support/resistance level.
    pub level_tolerance: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            min_candles: 20,
            period_floor: 3,
            adaptive: true,
            default_limit: 100,
            support_resistance_lookback: 50,
            level_tolerance: 0.001,
        }
    }
}

impl IndicatorSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_candles: env_or("INDICATOR_MIN_CANDLES", defaults.min_candles),
            period_floor: env_or("INDICATOR_PERIOD_FLOOR", defaults.period_floor).max(1),
            adaptive: env_or("INDICATOR_ADAPTIVE", defaults.adaptive),
            default_limit: env_or("INDICATOR_LIMIT", defaults.default_limit),
            ..defaults
        }
    }
}

/// Thresholds used by the signal rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSettings {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Multiplier turning a MACD histogram magnitude into a strength.
    pub macd_strength_scale: f64,
    /// Relative distance to a Bollinger band that counts as a touch.
    pub band_tolerance: f64,
    pub funding_extreme: f64,
    pub funding_strength_scale: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
            macd_strength_scale: 1000.0,
            band_tolerance: 0.01,
            funding_extreme: 0.01,
            funding_strength_scale: 5000.0,
        }
    }
}

impl SignalSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            funding_extreme: env_or("FUNDING_EXTREME_THRESHOLD", defaults.funding_extreme),
            ..defaults
        }
    }
}

/// Settings for a resampling pass over the store.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSettings {
    /// How far back base candles are read for each pass.
    pub lookback_hours: i64,
    /// Trades read when 1m candles must be bootstrapped from ticks.
    pub trade_fallback_limit: usize,
    pub schedule_interval_seconds: u64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            lookback_hours: 24,
            trade_fallback_limit: 1000,
            schedule_interval_seconds: 60,
        }
    }
}

impl AggregationSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lookback_hours: env_or("AGGREGATION_LOOKBACK_HOURS", defaults.lookback_hours),
            trade_fallback_limit: env_or("TRADE_FALLBACK_LIMIT", defaults.trade_fallback_limit),
            schedule_interval_seconds: env_or(
                "AGGREGATE_INTERVAL_SECONDS",
                defaults.schedule_interval_seconds,
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub indicators: IndicatorSettings,
    pub signals: SignalSettings,
    pub aggregation: AggregationSettings,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            indicators: IndicatorSettings::from_env(),
            signals: SignalSettings::from_env(),
            aggregation: AggregationSettings::from_env(),
        }
    }
}
