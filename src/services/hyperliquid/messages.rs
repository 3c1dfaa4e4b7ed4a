//! Wire types for the Hyperliquid WebSocket API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::HyperliquidError;
use crate::models::candle::parse_timestamp;
use crate::models::Trade;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Subscription {
    Trades { coin: String },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscribeRequest {
    pub method: &'static str,
    pub subscription: Subscription,
}

impl SubscribeRequest {
    pub fn trades(coin: impl Into<String>) -> Self {
        Self {
            method: "subscribe",
            subscription: Subscription::Trades { coin: coin.into() },
        }
    }
}

/// Keeps the server from closing an idle connection.
pub const PING_MESSAGE: &str = r#"{"method":"ping"}"#;

#[derive(Debug, Deserialize)]
struct Envelope {
    channel: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct RawTrade {
    coin: Option<String>,
    px: Option<String>,
    /// Epoch milliseconds, as a number or a string.
    time: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// Trades that parsed cleanly, plus how many rows were rejected.
    Trades { trades: Vec<Trade>, dropped: usize },
    /// Any other channel (subscription acks, pongs, errors).
    Other { channel: String },
}

pub fn parse_message(text: &str) -> Result<StreamMessage, HyperliquidError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if envelope.channel != "trades" {
        return Ok(StreamMessage::Other {
            channel: envelope.channel,
        });
    }

    let rows: Vec<RawTrade> = serde_json::from_value(envelope.data)?;
    let total = rows.len();
    let trades: Vec<Trade> = rows.into_iter().filter_map(convert_trade).collect();

    Ok(StreamMessage::Trades {
        dropped: total - trades.len(),
        trades,
    })
}

fn convert_trade(raw: RawTrade) -> Option<Trade> {
    let (Some(coin), Some(px), Some(time)) = (raw.coin, raw.px, raw.time) else {
        warn!("Dropping trade with missing coin, px or time");
        return None;
    };

    let price = match px.parse::<f64>() {
        Ok(p) if p.is_finite() && p > 0.0 => p,
        _ => {
            warn!(symbol = %coin, px = %px, "Dropping trade with invalid price");
            return None;
        }
    };

    let raw_time = match time {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let timestamp = match parse_timestamp(&raw_time) {
        Ok(ts) => ts,
        Err(e) => {
            warn!(symbol = %coin, error = %e, "Dropping trade with invalid time");
            return None;
        }
    };

    Some(Trade::new(coin, price, timestamp))
}
