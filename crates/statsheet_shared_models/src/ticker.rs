use serde::{Deserialize, Serialize};

/// 24-hour rolling statistics for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub symbol: String,
    pub last_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub volume: f64,
}

impl TickerSnapshot {
    pub fn is_up(&self) -> bool {
        self.price_change >= 0.0
    }
}
