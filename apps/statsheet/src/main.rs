use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use config::Settings;
use dashboard::{ChartType, DashboardError, ViewOptions};
use data_fetcher::{fetch_symbols, BinanceGateway};
use dotenv::dotenv;
use statsheet_indicators::MacdParams;
use statsheet_shared_models::{Interval, Limit, RangePreset};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cache;
mod config;
mod dashboard;
mod data_fetcher;
mod export;
mod presentation;
mod report;

#[derive(Parser, Debug)]
#[command(author, version, about = "Binance market statistics dashboard", long_about = None)]
struct Args {
    /// Trading pair to analyse (e.g. BTCUSDT)
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Comma separated pairs to compare against the primary symbol
    #[arg(long)]
    compare: Option<String>,

    /// Candle interval: 1m, 5m, 15m, 1h, 4h, 1d, 1w
    #[arg(long, default_value = "1d")]
    interval: Interval,

    /// Time range preset (case-sensitive): 1D, 1W, 1M, 3M, 1Y, All
    #[arg(long, default_value = "1M", conflicts_with = "points")]
    range: RangePreset,

    /// Exact number of candles instead of a range preset
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=1000))]
    points: Option<u32>,

    /// Price chart style
    #[arg(long, value_enum, default_value_t = ChartType::Candlestick)]
    chart: ChartType,

    /// Overlay a Simple Moving Average
    #[arg(long)]
    sma: bool,

    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(5..=200))]
    sma_period: u32,

    /// Overlay an Exponential Moving Average
    #[arg(long)]
    ema: bool,

    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(5..=200))]
    ema_period: u32,

    /// Add an RSI panel
    #[arg(long)]
    rsi: bool,

    #[arg(long, default_value_t = 14, value_parser = clap::value_parser!(u32).range(5..=30))]
    rsi_period: u32,

    /// Add a MACD (12/26/9) panel
    #[arg(long)]
    macd: bool,

    /// Rows of raw data to print (0 hides the table)
    #[arg(long, default_value_t = 20)]
    rows: usize,

    /// Also export the series as CSV
    #[arg(long)]
    csv: bool,

    /// Skip writing the HTML dashboard
    #[arg(long)]
    no_html: bool,

    /// Ignore cached responses
    #[arg(long)]
    refresh: bool,

    /// Re-render every N seconds
    #[arg(long)]
    watch: Option<u64>,
}

impl Args {
    fn limit(&self) -> Limit {
        match self.points {
            Some(points) => Limit::Points(points),
            None => Limit::Preset(self.range),
        }
    }

    fn view_options(&self) -> ViewOptions {
        ViewOptions {
            chart: self.chart,
            sma: self.sma.then_some(self.sma_period as usize),
            ema: self.ema.then_some(self.ema_period as usize),
            rsi: self.rsi.then_some(self.rsi_period as usize),
            macd: self.macd.then(MacdParams::default),
        }
    }
}

/// Primary symbol first, then comparison symbols; upper-cased, without
/// blanks or duplicates.
fn parse_symbols(primary: &str, compare: Option<&str>) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();

    let candidates = std::iter::once(primary).chain(compare.into_iter().flat_map(|c| c.split(',')));
    for candidate in candidates {
        let symbol = candidate.trim().to_uppercase();
        if !symbol.is_empty() && !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    symbols
}

async fn render_once(args: &Args, settings: &Settings, gateway: &BinanceGateway) -> anyhow::Result<()> {
    let symbols = parse_symbols(&args.symbol, args.compare.as_deref());
    let primary = symbols.first().context("No symbol given")?;
    let limit = args.limit().resolve(args.interval);

    if args.refresh {
        gateway.clear_cache();
    }

    info!(symbols = ?symbols, interval = %args.interval, limit, "Rendering dashboard");
    let fetched = fetch_symbols(gateway, &symbols, args.interval, limit).await;

    let dashboard = match dashboard::build(primary, fetched, &args.view_options()) {
        Ok(dashboard) => dashboard,
        Err(DashboardError::PrimaryUnavailable { symbol, message }) => {
            eprintln!("{message}");
            eprintln!("Please check that {symbol} is a valid trading pair (e.g., BTCUSDT, ETHUSDT, BNBUSDT).");
            anyhow::bail!("Could not load {symbol}");
        }
        Err(err) => return Err(err.into()),
    };

    report::print_terminal(&dashboard, args.rows);

    if !args.no_html {
        let path = report::export_html(&dashboard, &settings.output_dir)
            .context("Failed to write HTML dashboard")?;
        println!("\nDashboard written to {}", path.display());
    }

    if args.csv {
        let path = export::export_csv(dashboard.series(), &settings.output_dir, Utc::now())
            .context("Failed to export CSV")?;
        println!("CSV written to {}", path.display());
    }

    Ok(())
}

async fn run(args: Args, settings: Settings) -> anyhow::Result<()> {
    let gateway = BinanceGateway::new(&settings).context("Failed to create market data client")?;
    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create {}", settings.output_dir.display()))?;

    let Some(every) = args.watch else {
        return render_once(&args, &settings, &gateway).await;
    };

    let every = Duration::from_secs(every.max(1));
    loop {
        if let Err(e) = render_once(&args, &settings, &gateway).await {
            warn!(error = %e, "Render failed");
        }
        println!("\nNext refresh in {}s (Ctrl+C to stop)", every.as_secs());
        tokio::time::sleep(every).await;
    }
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("statsheet=info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::from_env().context("Invalid configuration")?;

    let rt = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    rt.block_on(run(args, settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_dedupes_symbols() {
        assert_eq!(
            parse_symbols("btcusdt", Some(" ethusdt, ,BTCUSDT,bnbusdt ")),
            ["BTCUSDT", "ETHUSDT", "BNBUSDT"]
        );
        assert_eq!(parse_symbols("BTCUSDT", None), ["BTCUSDT"]);
    }

    #[test]
    fn defaults_resolve_one_month_of_daily_candles() {
        let args = Args::parse_from(["statsheet"]);

        assert_eq!(args.limit(), Limit::Preset(RangePreset::OneMonth));
        assert_eq!(args.limit().resolve(args.interval), 30);
        let options = args.view_options();
        assert!(options.sma.is_none() && options.rsi.is_none() && options.macd.is_none());
    }

    #[test]
    fn indicator_flags_carry_periods() {
        let args = Args::parse_from([
            "statsheet", "--sma", "--sma-period", "50", "--rsi", "--macd", "--interval", "4h",
            "--points", "250",
        ]);
        let options = args.view_options();

        assert_eq!(options.sma, Some(50));
        assert_eq!(options.rsi, Some(14));
        assert_eq!(options.macd, Some(MacdParams::default()));
        assert_eq!(args.limit().resolve(args.interval), 250);
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        assert!(Args::try_parse_from(["statsheet", "--rsi-period", "40"]).is_err());
        assert!(Args::try_parse_from(["statsheet", "--points", "5"]).is_err());
        assert!(Args::try_parse_from(["statsheet", "--range", "1W", "--points", "50"]).is_err());
        assert!(Args::try_parse_from(["statsheet", "--interval", "2h"]).is_err());
        assert!(Args::try_parse_from(["statsheet", "--range", "1m"]).is_err());
    }
}
