//! Signal records and the cross-symbol signal board.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::candle::Interval;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
}

/// Rule that produced a signal. Serialized names are the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    RsiOversold,
    RsiOverbought,
    RsiBullishDivergence,
    MacdBullishCrossover,
    MacdBearishCrossover,
    BbOversold,
    BbOverbought,
    GoldenCross,
    DeathCross,
    ExtremeFundingBullish,
    ExtremeFundingBearish,
}

impl SignalType {
    pub fn direction(&self) -> SignalDirection {
        match self {
            SignalType::RsiOversold
            | SignalType::RsiBullishDivergence
            | SignalType::MacdBullishCrossover
            | SignalType::BbOversold
            | SignalType::GoldenCross
            | SignalType::ExtremeFundingBullish => SignalDirection::Bullish,
            SignalType::RsiOverbought
            | SignalType::MacdBearishCrossover
            | SignalType::BbOverbought
            | SignalType::DeathCross
            | SignalType::ExtremeFundingBearish => SignalDirection::Bearish,
        }
    }
}

/// One rule firing. Rule-specific readings are only present for the rule
/// that uses them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub symbol: String,
    pub interval: Interval,
    #[serde(rename = "type")]
    pub direction: SignalDirection,
    pub signal_type: SignalType,
    pub description: String,
    pub strength: f64,
    pub price: f64,
    pub detected_at: DateTime<Utc>,
    pub timeframe: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_band: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_band: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_rate: Option<f64>,
}

impl Signal {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        signal_type: SignalType,
        description: impl Into<String>,
        strength: f64,
        price: f64,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            direction: signal_type.direction(),
            signal_type,
            description: description.into(),
            strength: clamp_strength(strength),
            price,
            detected_at,
            timeframe: interval,
            rsi: None,
            macd: None,
            signal: None,
            histogram: None,
            lower_band: None,
            upper_band: None,
            sma20: None,
            sma50: None,
            funding_rate: None,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.direction == SignalDirection::Bullish
    }
}

/// Strength is always reported within `[0, 100]`; NaN maps to 0.
pub fn clamp_strength(strength: f64) -> f64 {
    if strength.is_nan() {
        0.0
    } else {
        strength.clamp(0.0, 100.0)
    }
}

/// Descending by strength.
pub fn by_strength_desc(a: &Signal, b: &Signal) -> Ordering {
    b.strength.total_cmp(&a.strength)
}

/// Signals for many symbols/intervals, split by direction and ranked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBoard {
    pub bullish: Vec<Signal>,
    pub bearish: Vec<Signal>,
    pub total: usize,
    pub timestamp: DateTime<Utc>,
}

impl SignalBoard {
    pub fn from_signals(signals: Vec<Signal>, timestamp: DateTime<Utc>) -> Self {
        let total = signals.len();
        let (mut bullish, mut bearish): (Vec<_>, Vec<_>) =
            signals.into_iter().partition(Signal::is_bullish);
        bullish.sort_by(by_strength_desc);
        bearish.sort_by(by_strength_desc);
        Self {
            bullish,
            bearish,
            total,
            timestamp,
        }
    }

    /// Both partitions merged, strongest first, truncated to `n`.
    pub fn top(&self, n: usize) -> Vec<Signal> {
        let mut merged: Vec<Signal> = self
            .bullish
            .iter()
            .chain(self.bearish.iter())
            .cloned()
            .collect();
        merged.sort_by(by_strength_desc);
        merged.truncate(n);
        merged
    }
}
