use crate::cache::TtlCache;
use crate::config::Settings;
use chrono::{DateTime, Utc};
use statsheet_binance::klines::{Kline, Klines, KlinesParams};
use statsheet_binance::ticker::{Ticker24hr, Ticker24hrResponse, TickerParams};
use statsheet_binance::{BinanceClient, BinanceError};
use statsheet_indicators::{PricePoint, Series, SeriesError};
use statsheet_shared_models::{Interval, TickerSnapshot, MAX_LIMIT};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error fetching data: {0}")]
    Exchange(#[from] BinanceError),
    #[error("Error processing data: {field} is not a number ('{value}')")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Error processing data: timestamp {0} is out of range")]
    InvalidTimestamp(i64),
    #[error("Error processing data: {0}")]
    Series(#[from] SeriesError),
    #[error("Cannot request {0} candles (allowed: 1 to 1000)")]
    LimitOutOfRange(u32),
}

fn parse_number(field: &'static str, value: &str) -> Result<f64, FetchError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| FetchError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn parse_time(millis: i64) -> Result<DateTime<Utc>, FetchError> {
    DateTime::from_timestamp_millis(millis).ok_or(FetchError::InvalidTimestamp(millis))
}

pub fn kline_to_price_point(kline: &Kline) -> Result<PricePoint, FetchError> {
    Ok(PricePoint {
        open_time: parse_time(kline.open_time)?,
        open: parse_number("open", &kline.open)?,
        high: parse_number("high", &kline.high)?,
        low: parse_number("low", &kline.low)?,
        close: parse_number("close", &kline.close)?,
        volume: parse_number("volume", &kline.volume)?,
        close_time: parse_time(kline.close_time)?,
        quote_volume: parse_number("quote_volume", &kline.quote_volume)?,
        trade_count: kline.trades,
    })
}

pub fn ticker_to_snapshot(ticker: &Ticker24hrResponse) -> Result<TickerSnapshot, FetchError> {
    Ok(TickerSnapshot {
        symbol: ticker.symbol.clone(),
        last_price: parse_number("lastPrice", &ticker.last_price)?,
        price_change: parse_number("priceChange", &ticker.price_change)?,
        price_change_percent: parse_number("priceChangePercent", &ticker.price_change_percent)?,
        high_24h: parse_number("highPrice", &ticker.high_price)?,
        low_24h: parse_number("lowPrice", &ticker.low_price)?,
        volume: parse_number("volume", &ticker.volume)?,
    })
}

/// Source of candles and ticker snapshots.
#[allow(async_fn_in_trait)]
pub trait MarketData {
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Series, FetchError>;

    async fn fetch_ticker(&self, symbol: &str) -> Result<TickerSnapshot, FetchError>;
}

type SeriesKey = (String, Interval, u32);

/// Binance-backed [`MarketData`] with short-lived result caching.
pub struct BinanceGateway {
    client: BinanceClient,
    series_cache: TtlCache<SeriesKey, Series>,
    ticker_cache: TtlCache<String, TickerSnapshot>,
}

impl BinanceGateway {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = BinanceClient::new(&settings.base_url, settings.http_timeout)?;
        info!(base_url = client.base_url(), "Market data gateway ready");

        Ok(Self {
            client,
            series_cache: TtlCache::new(settings.series_ttl),
            ticker_cache: TtlCache::new(settings.ticker_ttl),
        })
    }

    /// Forget every cached response.
    pub fn clear_cache(&self) {
        debug!(
            series = self.series_cache.len(),
            tickers = self.ticker_cache.len(),
            "Clearing cache"
        );
        self.series_cache.clear();
        self.ticker_cache.clear();
    }
}

impl MarketData for BinanceGateway {
    #[instrument(skip(self))]
    async fn fetch_series(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u32,
    ) -> Result<Series, FetchError> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(FetchError::LimitOutOfRange(limit));
        }

        let key = (symbol.to_string(), interval, limit);
        if let Some(series) = self.series_cache.get(&key) {
            debug!("Using cached series");
            return Ok(series);
        }

        let params = KlinesParams::builder()
            .symbol(symbol)
            .interval(interval)
            .limit(limit)
            .build();
        let klines = self.client.call::<Klines>(params).await?;

        let points = klines
            .iter()
            .map(kline_to_price_point)
            .collect::<Result<Vec<_>, _>>()?;
        let series = Series::new(symbol, interval, points)?;
        info!(candles = series.len(), "Fetched series");

        self.series_cache.insert(key, series.clone());
        Ok(series)
    }

    #[instrument(skip(self))]
    async fn fetch_ticker(&self, symbol: &str) -> Result<TickerSnapshot, FetchError> {
        if let Some(ticker) = self.ticker_cache.get(&symbol.to_string()) {
            debug!("Using cached ticker");
            return Ok(ticker);
        }

        let response = self
            .client
            .call::<Ticker24hr>(TickerParams::builder().symbol(symbol).build())
            .await?;
        let ticker = ticker_to_snapshot(&response)?;

        self.ticker_cache.insert(symbol.to_string(), ticker.clone());
        Ok(ticker)
    }
}

#[derive(Debug, Clone)]
pub struct SymbolData {
    pub series: Series,
    pub ticker: TickerSnapshot,
}

/// Per-symbol fetch results, in request order.
#[derive(Debug, Default)]
pub struct FetchedSymbols {
    pub loaded: Vec<(String, SymbolData)>,
    pub errors: Vec<(String, String)>,
}

impl FetchedSymbols {
    pub fn get(&self, symbol: &str) -> Option<&SymbolData> {
        self.loaded
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, data)| data)
    }

    pub fn error_for(&self, symbol: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, message)| message.as_str())
    }
}

/// Fetch series and ticker for each symbol. A symbol is loaded only when both
/// succeed; otherwise its first error is recorded and the rest continue.
pub async fn fetch_symbols<M: MarketData>(
    source: &M,
    symbols: &[String],
    interval: Interval,
    limit: u32,
) -> FetchedSymbols {
    let mut fetched = FetchedSymbols::default();

    for symbol in symbols {
        let (series, ticker) = tokio::join!(
            source.fetch_series(symbol, interval, limit),
            source.fetch_ticker(symbol)
        );

        match (series, ticker) {
            (Ok(series), Ok(ticker)) => fetched
                .loaded
                .push((symbol.clone(), SymbolData { series, ticker })),
            (Err(err), _) | (Ok(_), Err(err)) => {
                warn!(%symbol, error = %err, "Could not load symbol");
                fetched.errors.push((symbol.clone(), err.to_string()));
            }
        }
    }

    fetched
}
