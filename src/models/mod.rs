//! Shared data models spanning the engine layers.

pub mod candle;
pub mod indicators;
pub mod signal;

pub use candle::{Candle, CandleError, Interval, Trade};
pub use indicators::{
    BollingerBands, IndicatorPeriods, IndicatorSet, Level, MacdSeries, SupportResistance,
};
pub use signal::{SignalBoard, Signal, SignalDirection, SignalType};
