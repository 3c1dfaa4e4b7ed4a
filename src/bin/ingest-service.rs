//! perpscope Ingest Service
//!
//! Holds the Hyperliquid trade subscription and appends every trade to the
//! store. Run a single instance.

use dotenvy::dotenv;
use perpscope::config;
use perpscope::db::{InMemoryStore, MarketStore, QuestDatabase};
use perpscope::logging;
use perpscope::metrics::Metrics;
use perpscope::services::hyperliquid::TradeStream;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let symbols = config::get_symbols();
    let url = config::get_hyperliquid_ws_url();
    info!(
        environment = %config::get_environment(),
        symbols = ?symbols,
        url = %url,
        "Starting perpscope ingest service"
    );

    let metrics = Arc::new(Metrics::new()?);

    let store: Arc<dyn MarketStore> = match QuestDatabase::new().await {
        Ok(db) => {
            info!("QuestDB connected");
            metrics.database_connected.set(1.0);
            Arc::new(db)
        }
        Err(e) => {
            warn!(error = %e, "QuestDB unavailable, trades will only be kept in memory");
            metrics.database_connected.set(0.0);
            Arc::new(InMemoryStore::new())
        }
    };

    let stream = TradeStream::new(url, symbols, store).with_metrics(metrics);

    tokio::select! {
        _ = stream.run() => {}
        _ = signal::ctrl_c() => {
            info!("Shutting down ingest service");
        }
    }

    Ok(())
}
