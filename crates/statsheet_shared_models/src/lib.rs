pub mod interval;
pub mod ticker;

pub use interval::{Interval, Limit, ParseError, RangePreset, MAX_LIMIT};
pub use ticker::TickerSnapshot;
