use crate::domain::ticker::Ticker;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Last close, rounded to cents.
    pub price: f64,
    /// Daily change in percent, rounded to 2 decimals.
    pub change_percentage: Option<f64>,
}

impl PriceSnapshot {
    pub fn from_closes(price: f64, previous_close: Option<f64>) -> Self {
        let change_percentage = previous_close
            .filter(|prev| prev.is_finite() && *prev != 0.0)
            .map(|prev| round2((price - prev) / prev * 100.0));
        Self {
            price: round2(price),
            change_percentage,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Everything collected about the picked stock before the analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: Ticker,
    pub price: Option<PriceSnapshot>,
    pub headlines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stock: StockData,
    pub discovery: String,
    pub analysis: String,
}

impl Recommendation {
    pub fn symbol(&self) -> &Ticker {
        &self.stock.symbol
    }

    /// The text shown to the user, verbatim.
    pub fn text(&self) -> String {
        format!(
            "AI Stock Discovery:\n{}\n\nDetailed Analysis:\n{}",
            self.discovery, self.analysis
        )
    }
}
