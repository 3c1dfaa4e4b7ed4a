//! perpscope: multi-timeframe candles, technical indicators and trading
//! signals for Hyperliquid perpetuals.

pub mod common;
pub mod config;
pub mod core;
pub mod db;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod resample;
pub mod services;
pub mod signals;
