//! Individual signal rules. Each one is a stateless predicate over the last
//! one or two points of an indicator set.

use crate::config::SignalSettings;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::{Signal, SignalType};
use crate::signals::scoring::{
    funding_strength, macd_strength, rsi_strength, BOLLINGER_TOUCH_STRENGTH, MA_CROSS_STRENGTH,
    RSI_MOMENTUM_STRENGTH,
};

fn signal(
    set: &IndicatorSet,
    signal_type: SignalType,
    description: String,
    strength: f64,
) -> Signal {
    Signal::new(
        set.symbol.clone(),
        set.interval,
        signal_type,
        description,
        strength,
        set.current_price,
        set.as_of,
    )
}

/// Oversold/overbought thresholds plus recovering momentum below the midline.
pub fn rsi_signals(set: &IndicatorSet, settings: &SignalSettings) -> Vec<Signal> {
    let mut signals = Vec::new();
    let Some(current) = set.latest_rsi() else {
        return signals;
    };

    if current < settings.rsi_oversold {
        let mut s = signal(
            set,
            SignalType::RsiOversold,
            format!("RSI oversold ({:.1})", current),
            rsi_strength(current),
        );
        s.rsi = Some(current);
        signals.push(s);
    }

    if current > settings.rsi_overbought {
        let mut s = signal(
            set,
            SignalType::RsiOverbought,
            format!("RSI overbought ({:.1})", current),
            rsi_strength(current),
        );
        s.rsi = Some(current);
        signals.push(s);
    }

    if set.rsi.len() > 2 {
        if let Some((previous, current)) = IndicatorSet::last_pair(&set.rsi) {
            if previous < current && current > 30.0 && current < 50.0 {
                let mut s = signal(
                    set,
                    SignalType::RsiBullishDivergence,
                    format!("RSI showing bullish momentum ({:.1})", current),
                    RSI_MOMENTUM_STRENGTH,
                );
                s.rsi = Some(current);
                signals.push(s);
            }
        }
    }

    signals
}

/// Histogram sign flip between the last two bars.
pub fn macd_signals(set: &IndicatorSet, settings: &SignalSettings) -> Option<Signal> {
    let (previous, current) = IndicatorSet::last_pair(&set.macd.histogram)?;

    let (signal_type, description) = if previous <= 0.0 && current > 0.0 {
        (SignalType::MacdBullishCrossover, "MACD bullish crossover")
    } else if previous >= 0.0 && current < 0.0 {
        (SignalType::MacdBearishCrossover, "MACD bearish crossover")
    } else {
        return None;
    };

    let mut s = signal(
        set,
        signal_type,
        description.to_string(),
        macd_strength(current, settings.macd_strength_scale),
    );
    s.macd = set.macd.macd.last().copied();
    s.signal = set.macd.signal.last().copied();
    s.histogram = Some(current);
    Some(s)
}

/// Price within the tolerance of either Bollinger band.
pub fn bollinger_signals(set: &IndicatorSet, settings: &SignalSettings) -> Vec<Signal> {
    let mut signals = Vec::new();
    let bands = &set.bollinger_bands;
    let (Some(&upper), Some(&lower)) = (bands.upper.last(), bands.lower.last()) else {
        return signals;
    };
    let price = set.current_price;

    if price <= lower * (1.0 + settings.band_tolerance) {
        let mut s = signal(
            set,
            SignalType::BbOversold,
            "Price near Bollinger lower band".to_string(),
            BOLLINGER_TOUCH_STRENGTH,
        );
        s.lower_band = Some(lower);
        signals.push(s);
    }

    if price >= upper * (1.0 - settings.band_tolerance) {
        let mut s = signal(
            set,
            SignalType::BbOverbought,
            "Price near Bollinger upper band".to_string(),
            BOLLINGER_TOUCH_STRENGTH,
        );
        s.upper_band = Some(upper);
        signals.push(s);
    }

    signals
}

/// SMA20 crossing SMA50 between the last two bars (golden/death cross).
pub fn moving_average_signals(set: &IndicatorSet) -> Option<Signal> {
    let (prev_fast, fast) = IndicatorSet::last_pair(&set.sma20)?;
    let (prev_slow, slow) = IndicatorSet::last_pair(&set.sma50)?;

    let (signal_type, description) = if prev_fast <= prev_slow && fast > slow {
        (SignalType::GoldenCross, "Golden Cross (SMA20 > SMA50)")
    } else if prev_fast >= prev_slow && fast < slow {
        (SignalType::DeathCross, "Death Cross (SMA20 < SMA50)")
    } else {
        return None;
    };

    let mut s = signal(set, signal_type, description.to_string(), MA_CROSS_STRENGTH);
    s.sma20 = Some(fast);
    s.sma50 = Some(slow);
    Some(s)
}

/// Funding rate beyond the configured magnitude.
pub fn funding_signals(set: &IndicatorSet, settings: &SignalSettings) -> Option<Signal> {
    let rate = set.funding_rate?;

    let (signal_type, description) = if rate > settings.funding_extreme {
        (
            SignalType::ExtremeFundingBullish,
            format!("Extremely high funding rate ({:.3}%)", rate * 100.0),
        )
    } else if rate < -settings.funding_extreme {
        (
            SignalType::ExtremeFundingBearish,
            format!("Extremely negative funding rate ({:.3}%)", rate * 100.0),
        )
    } else {
        return None;
    };

    let mut s = signal(
        set,
        signal_type,
        description,
        funding_strength(rate, settings.funding_strength_scale),
    );
    s.funding_rate = Some(rate);
    Some(s)
}
