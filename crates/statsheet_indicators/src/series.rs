use crate::price_point::PricePoint;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use statsheet_shared_models::Interval;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Series for {0} contains no candles")]
    Empty(String),
    #[error("Candle {index} of {symbol} does not open after the previous one")]
    NotIncreasing { symbol: String, index: usize },
}

/// Named numeric column of a [`Series`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
    QuoteVolume,
    TradeCount,
}

impl Column {
    fn pick(&self, point: &PricePoint) -> f64 {
        match self {
            Column::Open => point.open,
            Column::High => point.high,
            Column::Low => point.low,
            Column::Close => point.close,
            Column::Volume => point.volume,
            Column::QuoteVolume => point.quote_volume,
            Column::TradeCount => point.trade_count as f64,
        }
    }
}

/// Candles for one symbol and interval, oldest first.
///
/// Never empty, and `open_time` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    symbol: String,
    interval: Interval,
    points: Vec<PricePoint>,
}

impl Series {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        let symbol = symbol.into();

        if points.is_empty() {
            return Err(SeriesError::Empty(symbol));
        }

        if let Some(index) = points
            .iter()
            .tuple_windows()
            .position(|(prev, next)| next.open_time <= prev.open_time)
        {
            return Err(SeriesError::NotIncreasing {
                symbol,
                index: index + 1,
            });
        }

        Ok(Self {
            symbol,
            interval,
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a constructed series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &PricePoint {
        &self.points[0]
    }

    pub fn last(&self) -> &PricePoint {
        &self.points[self.points.len() - 1]
    }

    pub fn get(&self, index: usize) -> Option<&PricePoint> {
        self.points.get(index)
    }

    pub fn column(&self, column: Column) -> Vec<f64> {
        self.points.iter().map(|p| column.pick(p)).collect()
    }

    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        self.points.get(index).map(|p| column.pick(p))
    }

    pub fn open(&self) -> Vec<f64> {
        self.column(Column::Open)
    }

    pub fn high(&self) -> Vec<f64> {
        self.column(Column::High)
    }

    pub fn low(&self) -> Vec<f64> {
        self.column(Column::Low)
    }

    pub fn close(&self) -> Vec<f64> {
        self.column(Column::Close)
    }

    pub fn volume(&self) -> Vec<f64> {
        self.column(Column::Volume)
    }

    pub fn trade_count(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.trade_count).collect()
    }

    pub fn open_time(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.open_time).collect()
    }

    /// Close prices rebased so the first close equals 100.
    pub fn normalized_close(&self) -> Vec<f64> {
        let base = self.first().close;
        self.points.iter().map(|p| p.close / base * 100.0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(minute: i64, close: f64) -> PricePoint {
        let open_time = Utc.timestamp_opt(minute * 60, 0).unwrap();
        PricePoint {
            open_time,
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 10.0,
            close_time: open_time + chrono::Duration::seconds(59),
            quote_volume: close * 10.0,
            trade_count: 3,
        }
    }

    #[test]
    fn rejects_empty_series() {
        let err = Series::new("BTCUSDT", Interval::OneMinute, vec![]).unwrap_err();
        assert_eq!(err, SeriesError::Empty("BTCUSDT".into()));
    }

    #[test]
    fn rejects_duplicate_open_time() {
        let points = vec![point(0, 1.0), point(1, 2.0), point(1, 3.0)];
        let err = Series::new("BTCUSDT", Interval::OneMinute, points).unwrap_err();
        assert_eq!(
            err,
            SeriesError::NotIncreasing {
                symbol: "BTCUSDT".into(),
                index: 2
            }
        );
    }

    #[test]
    fn exposes_columns_by_position() {
        let points = vec![point(0, 10.0), point(1, 11.0), point(2, 12.0)];
        let series = Series::new("ETHUSDT", Interval::OneMinute, points).unwrap();

        assert_eq!(series.close(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.value(Column::Open, 1), Some(10.0));
        assert_eq!(series.value(Column::TradeCount, 2), Some(3.0));
        assert_eq!(series.value(Column::Close, 3), None);
    }

    #[test]
    fn normalizes_to_first_close() {
        let points = vec![point(0, 50.0), point(1, 75.0), point(2, 25.0)];
        let series = Series::new("BNBUSDT", Interval::OneMinute, points).unwrap();

        assert_eq!(series.normalized_close(), vec![100.0, 150.0, 50.0]);
    }
}
