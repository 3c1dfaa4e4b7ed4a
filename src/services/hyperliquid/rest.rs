//! Hyperliquid REST API client (`POST /info`)

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::HyperliquidError;
use crate::config;
use crate::services::market_data::FundingRateProvider;

/// How far back funding history is requested.
const FUNDING_HISTORY_HOURS: i64 = 24;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingEntry {
    pub coin: String,
    pub funding_rate: String,
    pub time: i64,
}

#[derive(Clone)]
pub struct HyperliquidRestClient {
    base_url: String,
    client: reqwest::Client,
}

impl HyperliquidRestClient {
    pub fn new() -> Self {
        Self::with_client(config::get_hyperliquid_api_url(), reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Funding history for `coin` over the last day, oldest first.
    pub async fn funding_history(&self, coin: &str) -> Result<Vec<FundingEntry>, HyperliquidError> {
        let start_time = (Utc::now() - Duration::hours(FUNDING_HISTORY_HOURS)).timestamp_millis();
        let body = json!({
            "type": "fundingHistory",
            "coin": coin,
            "startTime": start_time,
        });

        let response = self
            .client
            .post(format!("{}/info", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HyperliquidError::InvalidResponse(format!(
                "fundingHistory for {} returned {}",
                coin, status
            )));
        }

        let mut entries: Vec<FundingEntry> = response.json().await?;
        entries.sort_by_key(|e| e.time);
        debug!(coin = %coin, count = entries.len(), "Fetched funding history");
        Ok(entries)
    }

    pub async fn latest_funding(&self, coin: &str) -> Result<Option<f64>, HyperliquidError> {
        let entries = self.funding_history(coin).await?;
        let Some(latest) = entries.last() else {
            return Ok(None);
        };
        latest
            .funding_rate
            .parse::<f64>()
            .map(Some)
            .map_err(|e| {
                HyperliquidError::InvalidResponse(format!(
                    "bad fundingRate '{}' for {}: {}",
                    latest.funding_rate, coin, e
                ))
            })
    }
}

impl Default for HyperliquidRestClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FundingRateProvider for HyperliquidRestClient {
    async fn latest_funding_rate(
        &self,
        symbol: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.latest_funding(symbol).await?)
    }
}
