use crate::dashboard::Dashboard;
use crate::presentation::{self, format_thousands, format_usd, Figure, TABLE_HEADERS};
use prettytable::{Cell, Row, Table};
use statsheet_shared_models::TickerSnapshot;
use std::path::{Path, PathBuf};
use tracing::info;

/// Latest price and 24h statistics, one metric per line.
pub fn ticker_lines(ticker: &TickerSnapshot) -> Vec<String> {
    let arrow = if ticker.is_up() { "▲" } else { "▼" };

    vec![
        format!(
            "Price: {} {} {} ({:.2}%)",
            format_usd(ticker.last_price, 2),
            arrow,
            format_usd(ticker.price_change, 2),
            ticker.price_change_percent
        ),
        format!("24h High: {}", format_usd(ticker.high_24h, 2)),
        format!("24h Low: {}", format_usd(ticker.low_24h, 2)),
        format!("24h Volume: {}", format_thousands(ticker.volume, 2)),
    ]
}

/// The most recent `rows` candles, newest last.
pub fn data_table(dashboard: &Dashboard, rows: usize) -> Table {
    let mut table = Table::new();
    table.set_titles(Row::new(TABLE_HEADERS.iter().map(|h| Cell::new(h)).collect()));

    let all_rows = presentation::table_rows(dashboard.series());
    let skip = all_rows.len().saturating_sub(rows);
    for row in &all_rows[skip..] {
        table.add_row(Row::new(row.cells().iter().map(|c| Cell::new(c)).collect()));
    }

    table
}

pub fn print_terminal(dashboard: &Dashboard, rows: usize) {
    println!(
        "\n===== {} ({}) =====",
        dashboard.symbol,
        dashboard.series().interval().label()
    );
    for line in ticker_lines(&dashboard.primary.ticker) {
        println!("  {line}");
    }

    for warning in &dashboard.warnings {
        eprintln!("Warning: {warning}");
    }

    if rows > 0 {
        println!("\n--- Raw Data ---");
        data_table(dashboard, rows).printstd();
    }

    let stats = presentation::summary(dashboard.series());
    println!("\n--- Summary ---");
    println!("  Average Close: {}", format_usd(stats.average_close, 2));
    println!("  Total Volume: {}", format_thousands(stats.total_volume, 2));
    println!("  Total Trades: {}", format_thousands(stats.total_trades as f64, 0));
}

/// Escapes text for use in element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// JSON that cannot close the surrounding `<script>` element.
fn script_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn figure_script(figure: &Figure) -> serde_json::Result<String> {
    Ok(format!(
        "        Plotly.newPlot({}, {}, {});\n",
        script_json(&figure.id)?,
        script_json(&figure.data)?,
        script_json(&figure.layout)?
    ))
}

/// Renders every chart of the dashboard into one standalone HTML page.
pub fn render_html(dashboard: &Dashboard) -> serde_json::Result<String> {
    let figures = presentation::figures(dashboard);
    let title = escape_html(&format!(
        "{} Market Dashboard ({})",
        dashboard.symbol,
        dashboard.series().interval().label()
    ));

    let mut html_content = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{title}</title>
    <script src="https://cdn.plot.ly/plotly-latest.min.js"></script>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; }}
        .chart {{ width: 100%; }}
        .metrics {{ display: flex; gap: 32px; }}
        .warning {{ color: #b36b00; }}
        h1 {{ color: #333; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <div class="metrics">
"#
    );

    for line in ticker_lines(&dashboard.primary.ticker) {
        html_content.push_str(&format!("        <div>{}</div>\n", escape_html(&line)));
    }
    html_content.push_str("    </div>\n");

    for warning in &dashboard.warnings {
        html_content.push_str(&format!(
            "    <p class=\"warning\">{}</p>\n",
            escape_html(warning)
        ));
    }
    for figure in &figures {
        html_content.push_str(&format!(
            "    <div class=\"chart\" id=\"{}\"></div>\n",
            escape_html(&figure.id)
        ));
    }

    html_content.push_str("    <script>\n");
    for figure in &figures {
        html_content.push_str(&figure_script(figure)?);
    }
    html_content.push_str("    </script>\n</body>\n</html>\n");

    Ok(html_content)
}

pub fn html_file_name(dashboard: &Dashboard) -> String {
    format!(
        "{}_{}_dashboard.html",
        dashboard.symbol,
        dashboard.series().interval()
    )
}

/// Writes the HTML dashboard into `dir` and returns its path.
pub fn export_html(dashboard: &Dashboard, dir: &Path) -> std::io::Result<PathBuf> {
    let html_content = render_html(dashboard)?;
    let path = dir.join(html_file_name(dashboard));

    std::fs::write(&path, html_content)?;
    info!(path = %path.display(), "Dashboard written");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{self, ChartType, ViewOptions};
    use crate::data_fetcher::fetch_symbols;
    use crate::data_fetcher::tests::StubMarket;
    use statsheet_indicators::MacdParams;
    use statsheet_shared_models::Interval;

    async fn dashboard(symbols: &[&str], options: ViewOptions) -> Dashboard {
        let market = StubMarket {
            failing_series: vec!["BADUSDT"],
            failing_ticker: vec![],
        };
        let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
        let fetched = fetch_symbols(&market, &symbols, Interval::FourHours, 40).await;
        dashboard::build(&symbols[0], fetched, &options).unwrap()
    }

    #[test]
    fn ticker_lines_show_direction() {
        let ticker = TickerSnapshot {
            symbol: "BTCUSDT".into(),
            last_price: 48_000.1,
            price_change: -120.5,
            price_change_percent: -0.25,
            high_24h: 48_500.0,
            low_24h: 47_000.0,
            volume: 1234.5,
        };
        let lines = ticker_lines(&ticker);

        assert_eq!(lines[0], "Price: $48,000.10 ▼ $-120.50 (-0.25%)");
        assert_eq!(lines[3], "24h Volume: 1,234.50");
    }

    #[tokio::test]
    async fn table_keeps_latest_rows() {
        let dashboard = dashboard(&["BTCUSDT"], ViewOptions::default()).await;
        let table = data_table(&dashboard, 5);

        assert_eq!(table.len(), 5);
        assert_eq!(table.get_row(4).unwrap().get_cell(4).unwrap().get_content(), "$139.0000");
    }

    #[tokio::test]
    async fn html_contains_one_plot_per_panel() {
        let options = ViewOptions {
            chart: ChartType::Candlestick,
            sma: Some(20),
            ema: None,
            rsi: Some(14),
            macd: Some(MacdParams::default()),
        };
        let dashboard = dashboard(&["BTCUSDT"], options).await;
        let html = render_html(&dashboard).unwrap();

        for id in ["price", "rsi", "macd", "volume"] {
            assert!(html.contains(&format!("Plotly.newPlot(\"{id}\"")));
        }
        assert!(html.contains("\"SMA(20)\""));
        assert!(html.contains("\"candlestick\""));
        assert_eq!(html_file_name(&dashboard), "BTCUSDT_4h_dashboard.html");
    }

    #[tokio::test]
    async fn comparison_html_lists_warnings() {
        let dashboard = dashboard(&["BTCUSDT", "ETHUSDT", "BADUSDT"], ViewOptions::default()).await;
        let html = render_html(&dashboard).unwrap();

        assert!(html.contains("Plotly.newPlot(\"comparison\""));
        assert!(!html.contains("Plotly.newPlot(\"price\""));
        assert!(html.contains("Could not load BADUSDT"));
    }

    #[tokio::test]
    async fn markup_in_symbols_is_escaped() {
        let market = StubMarket {
            failing_series: vec!["<IMG SRC=X ONERROR=ALERT(1)>"],
            failing_ticker: vec![],
        };
        let symbols: Vec<String> = ["BTCUSDT", "</SCRIPT>", "<IMG SRC=X ONERROR=ALERT(1)>"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let fetched = fetch_symbols(&market, &symbols, Interval::OneDay, 30).await;
        let dashboard = dashboard::build("BTCUSDT", fetched, &ViewOptions::default()).unwrap();

        let html = render_html(&dashboard).unwrap();

        assert!(!html.contains("<IMG"));
        assert!(html.contains("Could not load &lt;IMG SRC=X ONERROR=ALERT(1)&gt;"));
        // trace name of the loaded comparison series inside the script block
        assert!(html.contains("<\\/SCRIPT>"));
        assert!(!html.contains("</SCRIPT>"));
    }

    #[test]
    fn escapes_html_metacharacters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[tokio::test]
    async fn writes_html_file() {
        let dashboard = dashboard(&["BTCUSDT"], ViewOptions::default()).await;
        let dir = std::env::temp_dir().join(format!("statsheet-html-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let path = export_html(&dashboard, &dir).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
