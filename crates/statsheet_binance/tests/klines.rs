use statsheet_binance::klines::{Kline, Klines, KlinesParams};
use statsheet_binance::ticker::{Ticker24hr, Ticker24hrResponse, TickerParams};
use statsheet_binance::{BinanceClient, DEFAULT_BASE_URL};
use statsheet_shared_models::Interval;
use std::time::Duration;

const KLINES_BODY: &str = r#"[
  [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100", "148976.11427815",
   1499644799999, "2434.19055334", 308, "1756.87402397", "28.46694368", "0"],
  [1499644800000, "0.01577100", "0.01600000", "0.01500000", "0.01590000", "1200.5",
   1500249599999, "19.2", 41, "600.0", "9.5", "0"]
]"#;

const TICKER_BODY: &str = r#"{
  "symbol": "BNBBTC",
  "priceChange": "-94.99999800",
  "priceChangePercent": "-95.960",
  "weightedAvgPrice": "0.29628482",
  "prevClosePrice": "0.10002000",
  "lastPrice": "4.00000200",
  "lastQty": "200.00000000",
  "bidPrice": "4.00000000",
  "bidQty": "100.00000000",
  "askPrice": "4.00000200",
  "askQty": "100.00000000",
  "openPrice": "99.00000000",
  "highPrice": "100.00000000",
  "lowPrice": "0.10000000",
  "volume": "8913.30000000",
  "quoteVolume": "15.30000000",
  "openTime": 1499783499040,
  "closeTime": 1499869899040,
  "firstId": 28385,
  "lastId": 28460,
  "count": 76
}"#;

#[test]
fn decodes_positional_klines() {
    let klines: Vec<Kline> = serde_json::from_str(KLINES_BODY).expect("klines decode");

    assert_eq!(klines.len(), 2);
    assert_eq!(klines[0].open_time, 1499040000000);
    assert_eq!(klines[0].close, "0.01577100");
    assert_eq!(klines[0].quote_volume, "2434.19055334");
    assert_eq!(klines[0].trades, 308);
    assert_eq!(klines[1].close_time, 1500249599999);
}

#[test]
fn decodes_ticker_and_ignores_unknown_fields() {
    let ticker: Ticker24hrResponse = serde_json::from_str(TICKER_BODY).expect("ticker decode");

    assert_eq!(ticker.symbol, "BNBBTC");
    assert_eq!(ticker.last_price, "4.00000200");
    assert_eq!(ticker.price_change_percent, "-95.960");
    assert_eq!(ticker.high_price, "100.00000000");
    assert_eq!(ticker.count, 76);
}

#[test]
fn params_skip_unset_fields() {
    let params = KlinesParams::builder()
        .symbol("BTCUSDT")
        .interval(Interval::FourHours)
        .limit(500)
        .build();

    let json = serde_json::to_value(&params).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "symbol": "BTCUSDT", "interval": "4h", "limit": 500 })
    );
}

#[tokio::test]
#[ignore = "hits the live exchange API"]
pub async fn fetch_klines_and_ticker() {
    let client = BinanceClient::new(DEFAULT_BASE_URL, Duration::from_secs(10))
        .expect("Failed to build client");

    let klines = client
        .call::<Klines>(
            KlinesParams::builder()
                .symbol("BTCUSDT")
                .interval(Interval::OneDay)
                .limit(30)
                .build(),
        )
        .await
        .expect("Failed to fetch klines");
    assert_eq!(klines.len(), 30);

    let ticker = client
        .call::<Ticker24hr>(TickerParams::builder().symbol("BTCUSDT").build())
        .await
        .expect("Failed to fetch ticker");
    println!("{ticker:?}");
}
