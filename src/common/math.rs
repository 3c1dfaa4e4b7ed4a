//! Rolling-window math over price slices.

/// Mean of every window of `period` consecutive values.
///
/// Output length is `values.len() - period + 1`; empty when the period is
/// zero or longer than the input.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|window| window.iter().sum::<f64>() / period as f64)
        .collect()
}

/// Smoothing factor `2 / (period + 1)`.
pub fn ema_alpha(period: usize) -> f64 {
    2.0 / (period as f64 + 1.0)
}

/// Next EMA value from the previous one.
pub fn ema_from_previous(value: f64, previous: f64, period: usize) -> f64 {
    let alpha = ema_alpha(period);
    value * alpha + previous * (1.0 - alpha)
}

/// EMA seeded with the first value, one output per input.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&seed) = values.first() else {
        return Vec::new();
    };
    if period == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(values.len());
    out.push(seed);
    for &value in &values[1..] {
        let previous = out[out.len() - 1];
        out.push(ema_from_previous(value, previous, period));
    }
    out
}

/// Population standard deviation of a window.
pub fn population_std_dev(window: &[f64]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Pairwise difference `a[i] - b[i]` over the common trailing suffix.
pub fn diff_aligned(a: &[f64], b: &[f64]) -> Vec<f64> {
    let len = a.len().min(b.len());
    let a = &a[a.len() - len..];
    let b = &b[b.len() - len..];
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
