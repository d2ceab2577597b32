use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest number of candles the klines endpoint returns per request.
pub const MAX_LIMIT: u32 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown interval '{0}' (expected one of 1m, 5m, 15m, 1h, 4h, 1d, 1w)")]
    Interval(String),
    #[error("Unknown time range '{0}' (expected one of 1D, 1W, 1M, 3M, 1Y, All)")]
    Range(String),
}

/// Candle width supported by the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
        Interval::FourHours,
        Interval::OneDay,
        Interval::OneWeek,
    ];

    /// Wire code used by the exchange (`1m`, `1d`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Interval::OneMinute => 1,
            Interval::FiveMinutes => 5,
            Interval::FifteenMinutes => 15,
            Interval::OneHour => 60,
            Interval::FourHours => 240,
            Interval::OneDay => 1440,
            Interval::OneWeek => 10080,
        }
    }

    /// Human label, e.g. "4 hours".
    pub fn label(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1 minute",
            Interval::FiveMinutes => "5 minutes",
            Interval::FifteenMinutes => "15 minutes",
            Interval::OneHour => "1 hour",
            Interval::FourHours => "4 hours",
            Interval::OneDay => "1 day",
            Interval::OneWeek => "1 week",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s.trim())
            .ok_or_else(|| ParseError::Interval(s.to_string()))
    }
}

/// Preset look-back window.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangePreset {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "All")]
    All,
}

impl RangePreset {
    pub const ALL: [RangePreset; 6] = [
        RangePreset::OneDay,
        RangePreset::OneWeek,
        RangePreset::OneMonth,
        RangePreset::ThreeMonths,
        RangePreset::OneYear,
        RangePreset::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangePreset::OneDay => "1D",
            RangePreset::OneWeek => "1W",
            RangePreset::OneMonth => "1M",
            RangePreset::ThreeMonths => "3M",
            RangePreset::OneYear => "1Y",
            RangePreset::All => "All",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            RangePreset::OneDay => 1_440,
            RangePreset::OneWeek => 10_080,
            RangePreset::OneMonth => 43_200,
            RangePreset::ThreeMonths => 129_600,
            RangePreset::OneYear => 525_600,
            RangePreset::All => 1_000_000,
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RangePreset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str() == s.trim())
            .ok_or_else(|| ParseError::Range(s.to_string()))
    }
}

/// How many candles to request: derived from a preset range or given directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Preset(RangePreset),
    Points(u32),
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Preset(RangePreset::default())
    }
}

impl Limit {
    /// Number of candles for `interval`, always within `1..=MAX_LIMIT`.
    pub fn resolve(&self, interval: Interval) -> u32 {
        let points = match self {
            Limit::Preset(preset) => preset.minutes() / interval.minutes(),
            Limit::Points(points) => *points,
        };

        points.clamp(1, MAX_LIMIT)
    }
}
