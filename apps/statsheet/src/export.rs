use chrono::{DateTime, Utc};
use polars::prelude::*;
use statsheet_indicators::Series as PriceSeries;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `BTCUSDT_1d_20250102_030405.csv`
pub fn csv_file_name(series: &PriceSeries, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.csv",
        series.symbol(),
        series.interval(),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// One row per candle with the derived change columns.
pub fn to_frame(series: &PriceSeries) -> Result<DataFrame, ExportError> {
    let points = series.points();

    let timestamp = Column::new(
        "timestamp".into(),
        points
            .iter()
            .map(|p| p.open_time.timestamp_millis())
            .collect::<Vec<_>>(),
    )
    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let frame = DataFrame::new(vec![
        timestamp,
        Column::new("open".into(), series.open()),
        Column::new("high".into(), series.high()),
        Column::new("low".into(), series.low()),
        Column::new("close".into(), series.close()),
        Column::new("volume".into(), series.volume()),
        Column::new("trades".into(), series.trade_count()),
        Column::new(
            "change".into(),
            points.iter().map(|p| p.change()).collect::<Vec<_>>(),
        ),
        Column::new(
            "change_percent".into(),
            points.iter().map(|p| p.change_percent()).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(frame)
}

/// Writes the series as CSV into `dir` and returns the file path.
pub fn export_csv(
    series: &PriceSeries,
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    let mut frame = to_frame(series)?;
    let path = dir.join(csv_file_name(series, now));

    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_datetime_format(Some(CSV_DATETIME_FORMAT.to_string()))
        .finish(&mut frame)?;

    info!(path = %path.display(), rows = frame.height(), "CSV written");
    Ok(path)
}
