pub mod align;
pub mod error;
pub mod indicator_series;
pub mod indicators;
pub mod price_point;
pub mod series;

pub use error::IndicatorError;
pub use indicator_series::IndicatorSeries;
pub use indicators::{ema, ema_series, macd, rsi, sma, Indicators, Macd, MacdParams};
pub use price_point::PricePoint;
pub use series::{Column, Series, SeriesError};
