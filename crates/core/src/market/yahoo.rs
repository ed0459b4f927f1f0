use crate::domain::recommendation::PriceSnapshot;
use crate::domain::ticker::Ticker;
use crate::market::{snapshot_from_closes, MarketDataClient, MarketDataError};
use anyhow::Context;
use yahoo_finance_api as yahoo;

// Daily bars; the connector returns roughly one month of them.
const QUOTE_INTERVAL: &str = "1d";

/// Latest price from Yahoo Finance daily quotes. No API key needed.
pub struct YahooMarketData {
    connector: yahoo::YahooConnector,
}

impl YahooMarketData {
    pub fn new() -> anyhow::Result<Self> {
        let connector =
            yahoo::YahooConnector::new().context("failed to build Yahoo Finance connector")?;
        Ok(Self { connector })
    }
}

#[async_trait::async_trait]
impl MarketDataClient for YahooMarketData {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn latest_price(&self, symbol: &Ticker) -> Result<PriceSnapshot, MarketDataError> {
        let response = self
            .connector
            .get_latest_quotes(symbol.as_str(), QUOTE_INTERVAL)
            .await
            .map_err(|e| MarketDataError::Upstream(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketDataError::Upstream(e.to_string()))?;

        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        snapshot_from_closes(&closes)
    }
}
