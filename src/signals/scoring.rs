//! Strength scoring for the signal rules.
//!
//! Every score ends up in `[0, 100]`; the per-rule caps keep a single
//! extreme reading from dominating the ranking.

use crate::models::signal::clamp_strength;

pub const RSI_STRENGTH_CAP: f64 = 95.0;
pub const MACD_STRENGTH_CAP: f64 = 90.0;
pub const FUNDING_STRENGTH_CAP: f64 = 95.0;
pub const BOLLINGER_TOUCH_STRENGTH: f64 = 75.0;
pub const MA_CROSS_STRENGTH: f64 = 80.0;
pub const RSI_MOMENTUM_STRENGTH: f64 = 60.0;

/// Twice the distance of the RSI from the 50 midline.
pub fn rsi_strength(rsi: f64) -> f64 {
    clamp_strength(((rsi - 50.0).abs() * 2.0).min(RSI_STRENGTH_CAP))
}

pub fn macd_strength(histogram: f64, scale: f64) -> f64 {
    clamp_strength((histogram.abs() * scale).min(MACD_STRENGTH_CAP))
}

pub fn funding_strength(rate: f64, scale: f64) -> f64 {
    clamp_strength((rate.abs() * scale).min(FUNDING_STRENGTH_CAP))
}
