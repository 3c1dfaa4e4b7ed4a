//! RSI (Relative Strength Index) indicator

/// Calculate RSI with simple rolling averages of gains and losses.
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// One value per bar once `period` price changes are available, so the
/// output length is `closes.len() - period`. A window without losses reads
/// 100.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() < period + 1 {
        return Vec::new();
    }

    let mut gains = Vec::with_capacity(closes.len() - 1);
    let mut losses = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    gains
        .windows(period)
        .zip(losses.windows(period))
        .map(|(gain_window, loss_window)| {
            let avg_gain = gain_window.iter().sum::<f64>() / period as f64;
            let avg_loss = loss_window.iter().sum::<f64>() / period as f64;
            if avg_loss == 0.0 {
                return 100.0;
            }
            let rs = avg_gain / avg_loss;
            (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
        })
        .collect()
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> Vec<f64> {
    calculate_rsi(closes, 14)
}
