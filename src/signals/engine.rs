//! Signal evaluation over a computed indicator set.

use tracing::debug;

use crate::config::SignalSettings;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::{by_strength_desc, Signal};
use crate::signals::rules;

/// Run every rule against the latest points of `set`.
///
/// Evaluation keeps no memory of earlier calls: a condition that still
/// holds fires again on the next evaluation. Results are strongest first.
pub fn detect_signals(set: &IndicatorSet, settings: &SignalSettings) -> Vec<Signal> {
    let mut signals = Vec::new();
    signals.extend(rules::rsi_signals(set, settings));
    signals.extend(rules::macd_signals(set, settings));
    signals.extend(rules::bollinger_signals(set, settings));
    signals.extend(rules::moving_average_signals(set));
    signals.extend(rules::funding_signals(set, settings));

    signals.sort_by(by_strength_desc);

    debug!(
        symbol = %set.symbol,
        interval = %set.interval,
        count = signals.len(),
        "Detected signals"
    );
    signals
}
