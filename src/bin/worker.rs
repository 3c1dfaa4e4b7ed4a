//! perpscope Worker
//!
//! Schedules and processes candle aggregation jobs from the Redis queue.
//! Can run as several instances; jobs are idempotent.

use apalis_redis::RedisStorage;
use dotenvy::dotenv;
use perpscope::config::{self, EngineConfig};
use perpscope::core::runtime::AggregationRuntime;
use perpscope::core::scheduler::JobScheduler;
use perpscope::db::QuestDatabase;
use perpscope::jobs::context::JobContext;
use perpscope::jobs::types::AggregateCandlesJob;
use perpscope::logging;
use perpscope::metrics::Metrics;
use perpscope::services::analysis::MarketAnalyzer;
use perpscope::services::hyperliquid::HyperliquidRestClient;
use std::env;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let engine_config = EngineConfig::from_env();
    let symbols = config::get_symbols();
    let interval = engine_config.aggregation.schedule_interval_seconds;

    info!(
        environment = %config::get_environment(),
        symbols = ?symbols,
        interval_seconds = interval,
        "Starting perpscope worker"
    );

    let metrics = Arc::new(Metrics::new()?);

    // The worker writes aggregates, so the store is required here
    let database = QuestDatabase::new()
        .await
        .map_err(|e| format!("QuestDB connection required for worker: {}", e))?;
    metrics.database_connected.set(1.0);
    info!("QuestDB connected");

    let analyzer = MarketAnalyzer::new(Arc::new(database), engine_config)
        .with_funding(Arc::new(HyperliquidRestClient::new()))
        .with_metrics(metrics.clone());
    let job_context = Arc::new(JobContext::new(analyzer, Some(metrics)));

    let conn = apalis_redis::connect(config::get_redis_url()).await?;
    let storage: RedisStorage<AggregateCandlesJob> = RedisStorage::new(conn);
    info!("Apalis Redis storage initialized");

    let concurrency: usize = env::var("WORKER_CONCURRENCY")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or_else(|| symbols.len().max(1));

    let runtime = AggregationRuntime::new(job_context, storage.clone()).with_concurrency(concurrency);
    let worker_handles = runtime.start();

    let scheduler = JobScheduler::new(storage, symbols, interval)
        .map_err(|e| format!("Failed to create scheduler: {}", e))?;
    scheduler.start().await;

    info!("Worker started, waiting for shutdown signal");
    signal::ctrl_c().await?;

    info!("Shutting down worker");
    scheduler.stop().await;
    for handle in worker_handles {
        handle.abort();
    }
    info!("Worker stopped");

    Ok(())
}
