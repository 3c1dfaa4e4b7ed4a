//! Long-lived trade subscription that feeds the store

use backon::{ExponentialBuilder, Retryable};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::messages::{parse_message, StreamMessage, SubscribeRequest, PING_MESSAGE};
use super::HyperliquidError;
use crate::db::MarketStore;
use crate::metrics::Metrics;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub struct TradeStream {
    url: String,
    symbols: Vec<String>,
    store: Arc<dyn MarketStore>,
    metrics: Option<Arc<Metrics>>,
}

impl TradeStream {
    pub fn new(url: impl Into<String>, symbols: Vec<String>, store: Arc<dyn MarketStore>) -> Self {
        Self {
            url: url.into(),
            symbols,
            store,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn reconnect_policy() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(30))
            .with_max_times(10)
            .with_jitter()
    }

    /// Connect, subscribe and ingest until the process stops.
    pub async fn run(&self) {
        loop {
            let connected = (|| self.connect())
                .retry(Self::reconnect_policy())
                .notify(|e: &HyperliquidError, delay: Duration| {
                    warn!(error = %e, delay_ms = delay.as_millis(), "Trade stream connect failed, retrying");
                })
                .await;

            match connected {
                Ok(ws) => match self.consume(ws).await {
                    Ok(()) => warn!("Trade stream closed by server, reconnecting"),
                    Err(e) => warn!(error = %e, "Trade stream dropped, reconnecting"),
                },
                Err(e) => {
                    error!(error = %e, "Trade stream could not connect, backing off");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        }
    }

    async fn connect(&self) -> Result<WsStream, HyperliquidError> {
        let (mut ws, _) = connect_async(self.url.as_str()).await?;
        info!(url = %self.url, "Trade stream connected");

        for symbol in &self.symbols {
            let request = serde_json::to_string(&SubscribeRequest::trades(symbol.as_str()))?;
            ws.send(Message::Text(request)).await?;
            debug!(symbol = %symbol, "Subscribed to trades");
        }
        Ok(ws)
    }

    async fn consume(&self, ws: WsStream) -> Result<(), HyperliquidError> {
        let (mut write, mut read) = ws.split();
        let mut heartbeat = tokio::time::interval(PING_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    write.send(Message::Text(PING_MESSAGE.to_string())).await?;
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = self.handle_text(&text).await {
                            warn!(error = %e, "Failed to handle trade stream message");
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
            }
        }
    }

    /// Parse one text frame and persist its trades. Returns the number stored.
    pub async fn handle_text(&self, text: &str) -> Result<usize, HyperliquidError> {
        match parse_message(text)? {
            StreamMessage::Trades { trades, dropped } => {
                if let Some(metrics) = &self.metrics {
                    metrics.invalid_rows_dropped_total.inc_by(dropped as u64);
                }
                if trades.is_empty() {
                    return Ok(0);
                }

                let stored = self.store.insert_trades(&trades).await?;
                if let Some(metrics) = &self.metrics {
                    metrics.trades_ingested_total.inc_by(stored as u64);
                }
                debug!(count = stored, "Stored trades");
                Ok(stored)
            }
            StreamMessage::Other { channel } => {
                debug!(channel = %channel, "Ignoring non-trade message");
                Ok(0)
            }
        }
    }
}
