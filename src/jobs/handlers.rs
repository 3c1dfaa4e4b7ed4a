//! Job handlers

use crate::jobs::context::{JobContext, REPORTED_INTERVALS};
use crate::jobs::types::AggregateCandlesJob;
use crate::services::aggregation::{aggregate_symbol, AggregationReport};
use apalis::prelude::*;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run one aggregation pass and log the signals it leaves behind.
///
/// Shared by the Apalis handler and the in-process fallback of
/// `POST /api/aggregate`.
pub async fn run_aggregation(
    ctx: &JobContext,
    symbol: &str,
) -> Result<AggregationReport, Box<dyn std::error::Error + Send + Sync>> {
    let analyzer = &ctx.analyzer;
    let report = aggregate_symbol(
        analyzer.store().as_ref(),
        symbol,
        &analyzer.config().aggregation,
        Utc::now(),
    )
    .await?;

    if let Some(ref metrics) = ctx.metrics {
        metrics.aggregation_runs_total.inc();
        metrics
            .candles_upserted_total
            .inc_by(report.total_upserted() as u64);
        metrics
            .invalid_rows_dropped_total
            .inc_by(report.dropped_rows as u64);
    }

    for interval in REPORTED_INTERVALS {
        match analyzer.signals(symbol, interval).await {
            Ok(signals) if signals.is_empty() => {
                debug!(symbol = %symbol, interval = %interval, "No signals after aggregation");
            }
            Ok(signals) => {
                for signal in &signals {
                    info!(
                        symbol = %symbol,
                        interval = %interval,
                        signal_type = ?signal.signal_type,
                        direction = ?signal.direction,
                        strength = signal.strength,
                        "{}",
                        signal.description
                    );
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, interval = %interval, error = %e, "Signal check failed");
            }
        }
    }

    Ok(report)
}

/// Handler for [`AggregateCandlesJob`]
pub async fn handle_aggregate_candles(
    job: AggregateCandlesJob,
    ctx: Data<Arc<JobContext>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    debug!(symbol = %job.symbol, "AggregateCandlesJob: starting");

    let report = run_aggregation(&ctx, &job.symbol).await?;

    info!(
        symbol = %job.symbol,
        base_candles = report.base_candles,
        upserted = report.total_upserted(),
        bootstrapped = report.bootstrapped_from_trades,
        "AggregateCandlesJob: done"
    );
    Ok(())
}
