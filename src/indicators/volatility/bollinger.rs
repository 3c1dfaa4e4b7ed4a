//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::BollingerBands;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * standard deviation)
/// Lower Band = Middle - (std_dev * standard deviation)
///
/// The deviation is the population standard deviation of the same window.
pub fn calculate_bollinger_bands(closes: &[f64], period: usize, std_dev: f64) -> BollingerBands {
    if period == 0 || closes.len() < period {
        return BollingerBands::default();
    }

    let middle = math::sma(closes, period);
    let (upper, lower): (Vec<f64>, Vec<f64>) = closes
        .windows(period)
        .zip(&middle)
        .map(|(window, mid)| {
            let band = std_dev * math::population_std_dev(window);
            (mid + band, mid - band)
        })
        .unzip();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn calculate_bollinger_bands_default(closes: &[f64]) -> BollingerBands {
    calculate_bollinger_bands(closes, 20, 2.0)
}
