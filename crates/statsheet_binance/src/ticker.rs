use crate::method::Method;
use bon::Builder;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct TickerParams {
    pub symbol: String,
}

/// Response of `GET /api/v3/ticker/24hr` for a single symbol.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticker24hrResponse {
    pub symbol: String,
    pub price_change: String,
    pub price_change_percent: String,
    #[serde(default)]
    pub weighted_avg_price: Option<String>,
    #[serde(default)]
    pub prev_close_price: Option<String>,
    pub last_price: String,
    #[serde(default)]
    pub open_price: Option<String>,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
    #[serde(default)]
    pub quote_volume: Option<String>,
    pub open_time: i64,
    pub close_time: i64,
    #[serde(default)]
    pub count: u64,
}

pub struct Ticker24hr;

impl Method for Ticker24hr {
    const PATH: &'static str = "/api/v3/ticker/24hr";

    type Response = Ticker24hrResponse;
    type Params = TickerParams;
}
