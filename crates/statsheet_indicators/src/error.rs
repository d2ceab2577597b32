use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndicatorError {
    #[error("Cannot compute an indicator over an empty series")]
    EmptySeries,
    #[error("Invalid {name} period: {period} (must be at least 1)")]
    InvalidPeriod { name: &'static str, period: usize },
    #[error("Series length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

pub type IndicatorResult<T> = Result<T, IndicatorError>;
