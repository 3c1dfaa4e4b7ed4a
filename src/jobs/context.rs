//! Job context for dependency injection

use crate::metrics::Metrics;
use crate::services::analysis::MarketAnalyzer;
use crate::models::Interval;
use std::sync::Arc;

/// Intervals whose signals are logged after each aggregation pass.
pub const REPORTED_INTERVALS: [Interval; 2] = [Interval::OneHour, Interval::FourHours];

/// Shared by every handler through Apalis `Data<Arc<JobContext>>`.
///
/// Jobs only read and write the store; they never open exchange connections.
pub struct JobContext {
    pub analyzer: MarketAnalyzer,
    pub metrics: Option<Arc<Metrics>>,
}

impl JobContext {
    pub fn new(analyzer: MarketAnalyzer, metrics: Option<Arc<Metrics>>) -> Self {
        Self { analyzer, metrics }
    }
}
