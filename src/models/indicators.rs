use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candle::Interval;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// A support or resistance price with the number of bars touching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub strength: u32,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub supports: Vec<Level>,
    pub resistances: Vec<Level>,
}

/// Periods actually used for each series. A value below the canonical
/// period means the series was computed on thin data; `None` means the
/// series is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorPeriods {
    pub sma20: Option<usize>,
    pub sma50: Option<usize>,
    pub ema12: Option<usize>,
    pub ema26: Option<usize>,
    pub rsi: Option<usize>,
    pub macd: Option<(usize, usize, usize)>,
    pub bollinger: Option<usize>,
    pub support_resistance: Option<usize>,
}

/// Every indicator for one symbol and interval, one entry per input candle
/// after warm-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub symbol: String,
    pub interval: Interval,
    pub as_of: DateTime<Utc>,
    pub current_price: f64,
    pub price_change_24h: f64,
    pub candle_count: usize,
    pub rsi: Vec<f64>,
    pub macd: MacdSeries,
    pub bollinger_bands: BollingerBands,
    pub sma20: Vec<f64>,
    pub sma50: Vec<f64>,
    pub ema12: Vec<f64>,
    pub ema26: Vec<f64>,
    pub vwap: Vec<f64>,
    pub support_resistance: SupportResistance,
    pub periods: IndicatorPeriods,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<f64>,
}

impl IndicatorSet {
    pub fn with_funding_rate(mut self, funding_rate: f64) -> Self {
        self.funding_rate = Some(funding_rate);
        self
    }

    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.last().copied()
    }

    /// Last two points of a series as `(previous, current)`.
    pub fn last_pair(series: &[f64]) -> Option<(f64, f64)> {
        match series {
            [.., prev, last] => Some((*prev, *last)),
            _ => None,
        }
    }
}
