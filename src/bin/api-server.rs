//! perpscope API Server
//!
//! Candles, indicators and signals over HTTP. Stateless apart from the
//! store, so it can be scaled horizontally.

use dotenvy::dotenv;
use perpscope::config;
use perpscope::core::http::start_server;
use perpscope::logging;
use std::env;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    info!(
        environment = %config::get_environment(),
        symbols = ?config::get_symbols(),
        port = port,
        "Starting perpscope API server"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
