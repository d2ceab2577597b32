use crate::data_fetcher::{FetchedSymbols, SymbolData};
use statsheet_indicators::{IndicatorError, IndicatorSeries, Indicators, Macd, MacdParams, Series};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("{message}")]
    PrimaryUnavailable { symbol: String, message: String },
    #[error("Failed to calculate indicators: {0}")]
    Indicator(#[from] IndicatorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ChartType {
    #[default]
    Candlestick,
    Line,
}

/// Which indicators to derive, and with which periods.
#[derive(Debug, Clone, Default)]
pub struct ViewOptions {
    pub chart: ChartType,
    pub sma: Option<usize>,
    pub ema: Option<usize>,
    pub rsi: Option<usize>,
    pub macd: Option<MacdParams>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Sma,
    Ema,
}

/// A moving average drawn over the price chart.
#[derive(Debug, Clone)]
pub struct Overlay {
    pub kind: OverlayKind,
    pub period: usize,
    pub values: IndicatorSeries,
}

impl Overlay {
    pub fn label(&self) -> String {
        match self.kind {
            OverlayKind::Sma => format!("SMA({})", self.period),
            OverlayKind::Ema => format!("EMA({})", self.period),
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub symbol: String,
    pub primary: SymbolData,
    /// Every loaded series, primary first; more than one means comparison mode.
    pub compared: Vec<Series>,
    pub overlays: Vec<Overlay>,
    pub rsi: Option<(usize, IndicatorSeries)>,
    pub macd: Option<Macd>,
    pub warnings: Vec<String>,
    pub chart: ChartType,
}

impl Dashboard {
    pub fn is_comparison(&self) -> bool {
        self.compared.len() > 1
    }

    pub fn series(&self) -> &Series {
        &self.primary.series
    }
}

/// Assembles the dashboard for `symbol` from fetch results.
///
/// Fails when the primary symbol did not load. Comparison symbols that failed
/// become warnings. Overlays are only derived outside comparison mode, where
/// the price chart is drawn.
pub fn build(
    symbol: &str,
    fetched: FetchedSymbols,
    options: &ViewOptions,
) -> Result<Dashboard, DashboardError> {
    let Some(primary) = fetched.get(symbol).cloned() else {
        let message = fetched
            .error_for(symbol)
            .unwrap_or("Error loading primary symbol")
            .to_string();
        return Err(DashboardError::PrimaryUnavailable {
            symbol: symbol.to_string(),
            message,
        });
    };

    let warnings: Vec<String> = fetched
        .errors
        .iter()
        .filter(|(s, _)| s != symbol)
        .map(|(s, err)| format!("Could not load {s}: {err}"))
        .collect();
    for warning in &warnings {
        warn!("{warning}");
    }

    let mut compared = vec![primary.series.clone()];
    compared.extend(
        fetched
            .loaded
            .into_iter()
            .filter(|(s, _)| s != symbol)
            .map(|(_, data)| data.series),
    );

    let indicators = Indicators::new(&primary.series);

    let mut overlays = Vec::new();
    if compared.len() == 1 {
        if let Some(period) = options.sma {
            overlays.push(Overlay {
                kind: OverlayKind::Sma,
                period,
                values: indicators.sma(period)?,
            });
        }
        if let Some(period) = options.ema {
            overlays.push(Overlay {
                kind: OverlayKind::Ema,
                period,
                values: indicators.ema(period)?,
            });
        }
    }

    let rsi = options
        .rsi
        .map(|period| indicators.rsi(period).map(|values| (period, values)))
        .transpose()?;
    let macd = options.macd.map(|params| indicators.macd(params)).transpose()?;

    Ok(Dashboard {
        symbol: symbol.to_string(),
        primary,
        compared,
        overlays,
        rsi,
        macd,
        warnings,
        chart: options.chart,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::fetch_symbols;
    use crate::data_fetcher::tests::StubMarket;
    use statsheet_shared_models::Interval;

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn all_indicators() -> ViewOptions {
        ViewOptions {
            chart: ChartType::Line,
            sma: Some(20),
            ema: Some(20),
            rsi: Some(14),
            macd: Some(MacdParams::default()),
        }
    }

    #[tokio::test]
    async fn single_symbol_gets_overlays_and_panels() {
        let market = StubMarket {
            failing_series: vec![],
            failing_ticker: vec![],
        };
        let fetched =
            fetch_symbols(&market, &symbols(&["BTCUSDT"]), Interval::OneDay, 60).await;

        let dashboard = build("BTCUSDT", fetched, &all_indicators()).unwrap();

        assert!(!dashboard.is_comparison());
        assert_eq!(dashboard.overlays.len(), 2);
        assert_eq!(dashboard.overlays[0].label(), "SMA(20)");
        assert_eq!(dashboard.overlays[0].values.first_defined_index(), Some(19));
        let (period, rsi) = dashboard.rsi.as_ref().unwrap();
        assert_eq!(*period, 14);
        // steadily rising closes
        assert_eq!(rsi.last(), Some(100.0));
        assert_eq!(dashboard.macd.as_ref().unwrap().histogram.len(), 60);
    }

    #[tokio::test]
    async fn comparison_skips_overlays_and_warns_on_failures() {
        let market = StubMarket {
            failing_series: vec!["BADUSDT"],
            failing_ticker: vec![],
        };
        let fetched = fetch_symbols(
            &market,
            &symbols(&["BTCUSDT", "ETHUSDT", "BADUSDT"]),
            Interval::OneDay,
            30,
        )
        .await;

        let dashboard = build("BTCUSDT", fetched, &all_indicators()).unwrap();

        assert!(dashboard.is_comparison());
        assert_eq!(dashboard.compared.len(), 2);
        assert!(dashboard.overlays.is_empty());
        assert!(dashboard.rsi.is_some());
        assert_eq!(dashboard.warnings.len(), 1);
        assert!(dashboard.warnings[0].starts_with("Could not load BADUSDT"));
    }

    #[tokio::test]
    async fn missing_primary_is_an_error() {
        let market = StubMarket {
            failing_series: vec!["BTCUSDT"],
            failing_ticker: vec![],
        };
        let fetched =
            fetch_symbols(&market, &symbols(&["BTCUSDT", "ETHUSDT"]), Interval::OneDay, 30).await;

        let err = build("BTCUSDT", fetched, &ViewOptions::default()).unwrap_err();
        assert!(matches!(err, DashboardError::PrimaryUnavailable { .. }));
        assert!(err.to_string().contains("Invalid symbol"));
    }
}
