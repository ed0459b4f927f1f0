pub mod yahoo;

use crate::domain::recommendation::PriceSnapshot;
use crate::domain::ticker::Ticker;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarketDataError {
    #[error("market data upstream error: {0}")]
    Upstream(String),

    #[error("no quotes returned for symbol")]
    NoData,

    #[error("latest price is not usable: {0}")]
    InvalidPrice(f64),
}

#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn latest_price(&self, symbol: &Ticker) -> Result<PriceSnapshot, MarketDataError>;
}

/// Build a snapshot from daily closes ordered oldest to newest.
pub fn snapshot_from_closes(closes: &[f64]) -> Result<PriceSnapshot, MarketDataError> {
    let (&price, earlier) = closes.split_last().ok_or(MarketDataError::NoData)?;
    if !price.is_finite() || price <= 0.0 {
        return Err(MarketDataError::InvalidPrice(price));
    }
    Ok(PriceSnapshot::from_closes(price, earlier.last().copied()))
}
