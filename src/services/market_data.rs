//! Market data interfaces consumed by the analysis layer.

use async_trait::async_trait;

/// Source of perpetual funding rates.
#[async_trait]
pub trait FundingRateProvider: Send + Sync {
    /// Most recent funding rate for `symbol`, or `None` when the venue has
    /// no history for it.
    async fn latest_funding_rate(
        &self,
        symbol: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Provider that never reports a funding rate.
pub struct NoFundingRates;

#[async_trait]
impl FundingRateProvider for NoFundingRates {
    async fn latest_funding_rate(
        &self,
        _symbol: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(None)
    }
}
