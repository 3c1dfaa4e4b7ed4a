//! Apalis worker setup for aggregation jobs

use crate::jobs::context::JobContext;
use crate::jobs::handlers;
use crate::jobs::types::AggregateCandlesJob;
use apalis::prelude::*;
use apalis_redis::RedisStorage;
use std::sync::Arc;
use tracing::info;

/// Runs the Apalis worker that drains [`AggregateCandlesJob`]s.
pub struct AggregationRuntime {
    job_context: Arc<JobContext>,
    storage: RedisStorage<AggregateCandlesJob>,
    concurrency: usize,
}

impl AggregationRuntime {
    pub fn new(job_context: Arc<JobContext>, storage: RedisStorage<AggregateCandlesJob>) -> Self {
        Self {
            job_context,
            storage,
            concurrency: 1,
        }
    }

    /// Number of workers pulling from the queue (default 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Spawn `concurrency` workers on the shared queue; abort the handles to stop them.
    pub fn start(&self) -> Vec<tokio::task::JoinHandle<()>> {
        info!(
            concurrency = self.concurrency,
            "AggregationRuntime: starting workers"
        );

        (0..self.concurrency)
            .map(|index| {
                let storage = self.storage.clone();
                let job_context = self.job_context.clone();
                tokio::spawn(async move {
                    let worker = WorkerBuilder::new(format!("aggregate-candles-worker-{}", index))
                        .data(job_context)
                        .backend(storage)
                        .build_fn(handlers::handle_aggregate_candles);

                    worker.run().await;
                })
            })
            .collect()
    }
}
