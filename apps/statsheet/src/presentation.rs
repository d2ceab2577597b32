use crate::dashboard::{ChartType, Dashboard, Overlay, OverlayKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use statsheet_indicators::indicators::{RSI_OVERBOUGHT, RSI_OVERSOLD};
use statsheet_indicators::{IndicatorSeries, Macd, Series};

const COMPARISON_COLORS: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];
const UP_COLOR: &str = "green";
const DOWN_COLOR: &str = "red";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Line {
    pub color: String,
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

impl Line {
    fn solid(color: &str) -> Self {
        Self {
            color: color.to_string(),
            width: 2.0,
            dash: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    PerBar(Vec<String>),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub color: Color,
}

/// One Plotly trace.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Scatter {
        name: String,
        x: Vec<String>,
        y: Vec<Option<f64>>,
        mode: &'static str,
        line: Line,
    },
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<Option<f64>>,
        marker: Marker,
        #[serde(skip_serializing_if = "Option::is_none")]
        opacity: Option<f64>,
    },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(rename = "rangeslider", skip_serializing_if = "Option::is_none")]
    pub range_slider: Option<RangeSlider>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RangeSlider {
    pub visible: bool,
}

/// Horizontal reference line spanning the plot width.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Annotation {
    pub xref: &'static str,
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(rename = "showarrow")]
    pub show_arrow: bool,
    #[serde(rename = "xanchor")]
    pub x_anchor: &'static str,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Layout {
    pub title: String,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub height: u32,
    pub template: &'static str,
    #[serde(rename = "hovermode")]
    pub hover_mode: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Layout {
    fn new(title: impl Into<String>, y_title: impl Into<String>, height: u32) -> Self {
        Self {
            title: title.into(),
            xaxis: Axis {
                title: "Date/Time".to_string(),
                range: None,
                range_slider: Some(RangeSlider { visible: false }),
            },
            yaxis: Axis {
                title: y_title.into(),
                range: None,
                range_slider: None,
            },
            height,
            template: "plotly_white",
            hover_mode: "x unified",
            shapes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    fn add_hline(&mut self, y: f64, color: &str, text: &str) {
        self.shapes.push(Shape {
            kind: "line",
            xref: "paper",
            x0: 0.0,
            x1: 1.0,
            y0: y,
            y1: y,
            line: Line {
                color: color.to_string(),
                width: 1.0,
                dash: Some("dash"),
            },
        });
        self.annotations.push(Annotation {
            xref: "paper",
            x: 1.0,
            y,
            text: text.to_string(),
            show_arrow: false,
            x_anchor: "right",
        });
    }
}

/// A chart ready to hand to `Plotly.newPlot`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Figure {
    #[serde(skip)]
    pub id: String,
    pub data: Vec<Trace>,
    pub layout: Layout,
}

fn timestamps(series: &Series) -> Vec<String> {
    series
        .points()
        .iter()
        .map(|p| format_timestamp(&p.open_time))
        .collect()
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}

fn overlay_color(overlay: &Overlay) -> &'static str {
    match overlay.kind {
        OverlayKind::Sma => "blue",
        OverlayKind::Ema => "orange",
    }
}

pub fn price_figure(series: &Series, chart: ChartType, overlays: &[Overlay]) -> Figure {
    let x = timestamps(series);

    let mut data = vec![match chart {
        ChartType::Candlestick => Trace::Candlestick {
            name: "Price".to_string(),
            x: x.clone(),
            open: series.open(),
            high: series.high(),
            low: series.low(),
            close: series.close(),
        },
        ChartType::Line => Trace::Scatter {
            name: "Close Price".to_string(),
            x: x.clone(),
            y: defined(&series.close()),
            mode: "lines",
            line: Line::solid("#1f77b4"),
        },
    }];

    data.extend(overlays.iter().map(|overlay| Trace::Scatter {
        name: overlay.label(),
        x: x.clone(),
        y: overlay.values.values().to_vec(),
        mode: "lines",
        line: Line::solid(overlay_color(overlay)),
    }));

    Figure {
        id: "price".to_string(),
        data,
        layout: Layout::new(
            format!(
                "{} Price Movement ({})",
                series.symbol(),
                series.interval().label()
            ),
            "Price (USD)",
            600,
        ),
    }
}

/// Close prices of every series rebased to 100 at their first candle.
pub fn comparison_figure(compared: &[Series]) -> Figure {
    let data = compared
        .iter()
        .enumerate()
        .map(|(idx, series)| Trace::Scatter {
            name: series.symbol().to_string(),
            x: timestamps(series),
            y: defined(&series.normalized_close()),
            mode: "lines",
            line: Line::solid(COMPARISON_COLORS[idx % COMPARISON_COLORS.len()]),
        })
        .collect();

    Figure {
        id: "comparison".to_string(),
        data,
        layout: Layout::new(
            "Normalized Price Comparison",
            "Normalized Price (Base = 100)",
            600,
        ),
    }
}

pub fn rsi_figure(series: &Series, period: usize, rsi: &IndicatorSeries) -> Figure {
    let mut layout = Layout::new(format!("RSI({period})"), "RSI Value", 300);
    layout.yaxis.range = Some([0.0, 100.0]);
    layout.add_hline(RSI_OVERBOUGHT, "red", "Overbought (70)");
    layout.add_hline(RSI_OVERSOLD, "green", "Oversold (30)");

    Figure {
        id: "rsi".to_string(),
        data: vec![Trace::Scatter {
            name: "RSI".to_string(),
            x: timestamps(series),
            y: rsi.values().to_vec(),
            mode: "lines",
            line: Line::solid("purple"),
        }],
        layout,
    }
}

/// Bar colours for the MACD histogram; undefined bars get the down colour
/// but carry no height.
pub fn histogram_colors(macd: &Macd) -> Vec<String> {
    macd.histogram_up()
        .into_iter()
        .map(|up| match up {
            Some(true) => UP_COLOR.to_string(),
            _ => DOWN_COLOR.to_string(),
        })
        .collect()
}

pub fn macd_figure(series: &Series, macd: &Macd) -> Figure {
    let x = timestamps(series);

    Figure {
        id: "macd".to_string(),
        data: vec![
            Trace::Scatter {
                name: "MACD".to_string(),
                x: x.clone(),
                y: macd.line.values().to_vec(),
                mode: "lines",
                line: Line::solid("blue"),
            },
            Trace::Scatter {
                name: "Signal".to_string(),
                x: x.clone(),
                y: macd.signal.values().to_vec(),
                mode: "lines",
                line: Line::solid("red"),
            },
            Trace::Bar {
                name: "Histogram".to_string(),
                x,
                y: macd.histogram.values().to_vec(),
                marker: Marker {
                    color: Color::PerBar(histogram_colors(macd)),
                },
                opacity: Some(0.5),
            },
        ],
        layout: Layout::new("MACD", "MACD Value", 300),
    }
}

pub fn volume_figure(series: &Series) -> Figure {
    Figure {
        id: "volume".to_string(),
        data: vec![Trace::Bar {
            name: "Volume".to_string(),
            x: timestamps(series),
            y: defined(&series.volume()),
            marker: Marker {
                color: Color::Single("lightblue".to_string()),
            },
            opacity: None,
        }],
        layout: Layout::new(
            format!("{} Trading Volume", series.symbol()),
            "Volume",
            300,
        ),
    }
}

/// Charts in display order.
pub fn figures(dashboard: &Dashboard) -> Vec<Figure> {
    let series = dashboard.series();

    let mut figures = vec![if dashboard.is_comparison() {
        comparison_figure(&dashboard.compared)
    } else {
        price_figure(series, dashboard.chart, &dashboard.overlays)
    }];

    if let Some((period, rsi)) = &dashboard.rsi {
        figures.push(rsi_figure(series, *period, rsi));
    }
    if let Some(macd) = &dashboard.macd {
        figures.push(macd_figure(series, macd));
    }
    figures.push(volume_figure(series));

    figures
}

/// One row of the data table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub trades: u64,
    pub change: f64,
    pub change_percent: f64,
}

impl TableRow {
    pub fn cells(&self) -> [String; 9] {
        [
            format_timestamp(&self.time),
            format_usd(self.open, 4),
            format_usd(self.high, 4),
            format_usd(self.low, 4),
            format_usd(self.close, 4),
            format_thousands(self.volume, 2),
            format_thousands(self.trades as f64, 0),
            format_usd(self.change, 4),
            format!("{:.2}", self.change_percent),
        ]
    }
}

pub const TABLE_HEADERS: [&str; 9] = [
    "Date/Time", "Open", "High", "Low", "Close", "Volume", "Trades", "Change", "Change %",
];

pub fn table_rows(series: &Series) -> Vec<TableRow> {
    series
        .points()
        .iter()
        .map(|p| TableRow {
            time: p.open_time,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
            trades: p.trade_count,
            change: p.change(),
            change_percent: p.change_percent(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub average_close: f64,
    pub total_volume: f64,
    pub total_trades: u64,
}

pub fn summary(series: &Series) -> Summary {
    let points = series.points();

    Summary {
        average_close: points.iter().map(|p| p.close).sum::<f64>() / points.len() as f64,
        total_volume: points.iter().map(|p| p.volume).sum(),
        total_trades: points.iter().map(|p| p.trade_count).sum(),
    }
}

/// `1234567.891` with 2 decimals -> `1,234,567.89`.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value.is_sign_negative() && formatted.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_usd(value: f64, decimals: usize) -> String {
    format!("${}", format_thousands(value, decimals))
}
