//! Cron-based scheduler for enqueuing aggregation jobs

use crate::jobs::types::AggregateCandlesJob;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Cron expression (with seconds field) firing every `interval_seconds`.
///
/// Intervals of a minute or more round down to whole minutes.
pub fn cron_expression(interval_seconds: u64) -> Option<String> {
    match interval_seconds {
        0 => None,
        s if s >= 60 => Some(format!("0 */{} * * * *", s / 60)),
        s => Some(format!("*/{} * * * * *", s)),
    }
}

/// Periodically pushes one [`AggregateCandlesJob`] per symbol.
pub struct JobScheduler {
    storage: RedisStorage<AggregateCandlesJob>,
    symbols: Vec<String>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl JobScheduler {
    pub fn new(
        storage: RedisStorage<AggregateCandlesJob>,
        symbols: Vec<String>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let cron_expr = cron_expression(interval_seconds)
            .ok_or("Scheduler disabled: interval_seconds is 0")?;

        let schedule = Schedule::from_str(&cron_expr)
            .map_err(|e| format!("Invalid cron expression '{}': {}", cron_expr, e))?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            symbols = ?symbols,
            "JobScheduler: created"
        );

        Ok(Self {
            storage,
            symbols,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub async fn start(&self) {
        let storage = self.storage.clone();
        let symbols = self.symbols.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("JobScheduler: waiting for first tick");

            loop {
                let Some(next_tick) = schedule.upcoming(chrono::Utc).next() else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                };
                let wait = (next_tick - chrono::Utc::now()).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                debug!(symbol_count = symbols.len(), "JobScheduler: tick");
                for symbol in &symbols {
                    let mut storage = storage.clone();
                    if let Err(e) = storage.push(AggregateCandlesJob::new(symbol.as_str())).await {
                        error!(symbol = %symbol, error = %e, "JobScheduler: failed to enqueue");
                    }
                }
            }
        });

        *self.handle.write().await = Some(handle);
        info!("JobScheduler: started");
    }

    pub async fn stop(&self) {
        if let Some(h) = self.handle.write().await.take() {
            h.abort();
            info!("JobScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
