use statsheet_binance::DEFAULT_BASE_URL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds { name: &'static str, value: String },
}

/// Process-wide settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub http_timeout: Duration,
    pub series_ttl: Duration,
    pub ticker_ttl: Duration,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(10),
            series_ttl: Duration::from_secs(60),
            ticker_ttl: Duration::from_secs(5),
            output_dir: PathBuf::from("."),
        }
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidSeconds { name, value }),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            base_url: lookup("STATSHEET_BASE_URL").unwrap_or(defaults.base_url),
            http_timeout: seconds(&lookup, "STATSHEET_HTTP_TIMEOUT_SECS", defaults.http_timeout)?,
            series_ttl: seconds(&lookup, "STATSHEET_SERIES_TTL_SECS", defaults.series_ttl)?,
            ticker_ttl: seconds(&lookup, "STATSHEET_TICKER_TTL_SECS", defaults.ticker_ttl)?,
            output_dir: lookup("STATSHEET_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
        })
    }
}
