//! Hyperliquid trade feed and REST client

pub mod messages;
pub mod rest;
pub mod stream;

use thiserror::Error;

pub use messages::{parse_message, StreamMessage, SubscribeRequest};
pub use rest::HyperliquidRestClient;
pub use stream::TradeStream;

#[derive(Debug, Error)]
pub enum HyperliquidError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Store(#[from] crate::db::StoreError),
}
