use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One candle as returned by the exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: DateTime<Utc>,
    pub quote_volume: f64,
    pub trade_count: u64,
}

impl PricePoint {
    /// `close - open`
    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// Change relative to the open, in percent.
    pub fn change_percent(&self) -> f64 {
        (self.close - self.open) / self.open * 100.0
    }
}
