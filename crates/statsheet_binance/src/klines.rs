use crate::method::Method;
use bon::Builder;
use serde::{Deserialize, Serialize};
use statsheet_shared_models::Interval;

#[derive(Serialize, Deserialize, Debug, Clone, Builder)]
#[builder(on(String, into))]
pub struct KlinesParams {
    pub symbol: String,
    pub interval: Interval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Positional layout of one kline as sent on the wire.
#[derive(Deserialize, Debug)]
struct KlineRow(
    i64,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    u64,
    String,
    String,
    #[allow(dead_code)] serde::de::IgnoredAny,
);

/// One candlestick. Prices and volumes are kept as the decimal strings the
/// exchange sends; parsing happens where the caller decides how to fail.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "KlineRow")]
pub struct Kline {
    pub open_time: i64,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub close_time: i64,
    pub quote_volume: String,
    pub trades: u64,
    pub taker_buy_base_volume: String,
    pub taker_buy_quote_volume: String,
}

impl From<KlineRow> for Kline {
    fn from(row: KlineRow) -> Self {
        let KlineRow(
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
            quote_volume,
            trades,
            taker_buy_base_volume,
            taker_buy_quote_volume,
            _,
        ) = row;

        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
            close_time,
            quote_volume,
            trades,
            taker_buy_base_volume,
            taker_buy_quote_volume,
        }
    }
}

pub struct Klines;

impl Method for Klines {
    const PATH: &'static str = "/api/v3/klines";

    type Response = Vec<Kline>;
    type Params = KlinesParams;
}
