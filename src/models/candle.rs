//! Trades, candle intervals and OHLCV candles.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candle resolution. The serialized codes are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
    ];

    /// The resolution candles are built at from raw trades.
    pub const BASE: Interval = Interval::OneMinute;

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
        }
    }

    pub fn minutes(&self) -> i64 {
        match self {
            Interval::OneMinute => 1,
            Interval::FiveMinutes => 5,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes => 30,
            Interval::OneHour => 60,
            Interval::FourHours => 240,
            Interval::OneDay => 1440,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes())
    }

    /// Every interval coarser than the base resolution.
    pub fn targets() -> impl Iterator<Item = Interval> {
        Self::ALL.into_iter().filter(|i| *i != Self::BASE)
    }

    /// Start of the UTC-aligned window containing `ts`.
    ///
    /// Minute intervals snap to the lower multiple of their length within the
    /// hour, `1h` to the top of the hour, `4h` to blocks starting at 00:00 and
    /// `1d` to midnight.
    pub fn window_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let hour = ts.hour();
        let minute = ts.minute();
        let (hour, minute) = match self {
            Interval::OneDay => (0, 0),
            Interval::FourHours => (hour / 4 * 4, 0),
            Interval::OneHour => (hour, 0),
            _ => {
                let step = self.minutes() as u32;
                (hour, minute / step * step)
            }
        };
        ts.date_naive()
            .and_hms_opt(hour, minute, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or(ts)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interval '{0}' (expected one of 1m, 5m, 15m, 30m, 1h, 4h, 1d)")]
pub struct ParseIntervalError(pub String);

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| ParseIntervalError(s.to_string()))
    }
}

/// A single executed trade as delivered by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp,
        }
    }
}

/// Reasons a candle row is rejected before it reaches a fold or the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("{field} must be positive and finite, got {value}")]
    NonPositivePrice { field: &'static str, value: f64 },
    #[error("{field} {value} lies outside the [{low}, {high}] range")]
    OutOfRange {
        field: &'static str,
        value: f64,
        low: f64,
        high: f64,
    },
    #[error("volume must be non-negative and finite, got {0}")]
    InvalidVolume(f64),
    #[error("unparseable timestamp: {0}")]
    InvalidTimestamp(String),
}

/// One OHLCV bar. `(symbol, interval, start_time)` identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub symbol: String,
    pub interval: Interval,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Build a candle whose window is `[start_time, start_time + interval)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        start_time: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            start_time,
            end_time: start_time + interval.duration(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Upsert key.
    pub fn key(&self) -> (String, Interval, DateTime<Utc>) {
        (self.symbol.clone(), self.interval, self.start_time)
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn validate(&self) -> Result<(), CandleError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CandleError::NonPositivePrice { field, value });
            }
        }
        for (field, value) in [("open", self.open), ("close", self.close)] {
            if value < self.low || value > self.high {
                return Err(CandleError::OutOfRange {
                    field,
                    value,
                    low: self.low,
                    high: self.high,
                });
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(CandleError::InvalidVolume(self.volume));
        }
        Ok(())
    }
}

/// Parse a feed/store timestamp: epoch milliseconds or RFC 3339.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CandleError> {
    let trimmed = raw.trim();
    if let Ok(millis) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| CandleError::InvalidTimestamp(raw.to_string()));
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| CandleError::InvalidTimestamp(raw.to_string()))
}
