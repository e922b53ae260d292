// =============================================================================
// Interactive HTML charts
// =============================================================================
//
// One self-contained page per ticker, rendered client-side by plotly.js:
//
//   row 1 (50%) — candlestick + EMA 20 (blue) + EMA 50 (red)
//   row 2 (25%) — MACD line (blue), signal line (red), histogram bars
//                 (green above zero, red otherwise)
//   row 3 (25%) — annualised rolling volatility (purple)
//
// The three rows share one x axis.  Undefined indicator positions are
// emitted as JSON `null`, which plotly draws as gaps.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::market_data::PriceSeries;
use crate::types::{columns, IndicatorSeries};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn line_trace(x: &[String], y: &[Option<f64>], name: &str, color: &str, width: u32, axis: u8) -> Value {
    json!({
        "type": "scatter",
        "mode": "lines",
        "x": x,
        "y": y,
        "name": name,
        "line": { "color": color, "width": width },
        "xaxis": axis_ref('x', axis),
        "yaxis": axis_ref('y', axis),
    })
}

fn axis_ref(kind: char, row: u8) -> String {
    if row <= 1 {
        kind.to_string()
    } else {
        format!("{kind}{row}")
    }
}

/// Column `name`, or an all-null column of the right length when the run
/// did not compute it (e.g. `EMA_50` left out of `ema_periods`).
fn column(indicators: &IndicatorSeries, name: &str) -> Vec<Option<f64>> {
    match indicators.get(name) {
        Some(values) => values.to_vec(),
        None => {
            warn!(column = name, "indicator column missing, chart trace left empty");
            vec![None; indicators.len()]
        }
    }
}

/// Build the plotly `data` array for one ticker.
pub fn build_traces(series: &PriceSeries, indicators: &IndicatorSeries) -> Vec<Value> {
    let x: Vec<String> = series
        .bars()
        .iter()
        .map(|b| b.timestamp.format("%Y-%m-%d").to_string())
        .collect();
    let bars = series.bars();

    let candlestick = json!({
        "type": "candlestick",
        "x": x,
        "open": bars.iter().map(|b| b.open).collect::<Vec<_>>(),
        "high": bars.iter().map(|b| b.high).collect::<Vec<_>>(),
        "low": bars.iter().map(|b| b.low).collect::<Vec<_>>(),
        "close": bars.iter().map(|b| b.close).collect::<Vec<_>>(),
        "name": format!("{} Price", series.ticker()),
        "xaxis": "x",
        "yaxis": "y",
    });

    let histogram = column(indicators, columns::MACD_HISTOGRAM);
    let histogram_colors: Vec<&str> = histogram
        .iter()
        .map(|v| if v.is_some_and(|h| h > 0.0) { "green" } else { "red" })
        .collect();

    vec![
        candlestick,
        line_trace(&x, &column(indicators, &columns::ema(20)), "EMA 20", "blue", 2, 1),
        line_trace(&x, &column(indicators, &columns::ema(50)), "EMA 50", "red", 2, 1),
        line_trace(&x, &column(indicators, columns::MACD_LINE), "MACD Line", "blue", 1, 2),
        line_trace(&x, &column(indicators, columns::SIGNAL_LINE), "Signal Line", "red", 1, 2),
        json!({
            "type": "bar",
            "x": x,
            "y": histogram,
            "name": "MACD Histogram",
            "marker": { "color": histogram_colors },
            "xaxis": "x2",
            "yaxis": "y2",
        }),
        line_trace(
            &x,
            &column(indicators, columns::ROLLING_VOLATILITY),
            "Rolling Volatility",
            "purple",
            2,
            3,
        ),
    ]
}

/// Plotly layout: three stacked rows sharing the bottom x axis.
pub fn build_layout(ticker: &str) -> Value {
    json!({
        "title": { "text": format!("{ticker} Stock Analysis") },
        "height": 800,
        "showlegend": true,
        "xaxis":  { "anchor": "y",  "matches": "x3", "showticklabels": false, "rangeslider": { "visible": false } },
        "xaxis2": { "anchor": "y2", "matches": "x3", "showticklabels": false },
        "xaxis3": { "anchor": "y3" },
        "yaxis":  { "domain": [0.51, 1.0] },
        "yaxis2": { "domain": [0.26, 0.49] },
        "yaxis3": { "domain": [0.0, 0.24] },
    })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// JSON safe to inline inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Render the full HTML page for one ticker.
pub fn render_html(series: &PriceSeries, indicators: &IndicatorSeries) -> String {
    let ticker = series.ticker();
    let data = Value::Array(build_traces(series, indicators));
    let layout = build_layout(ticker);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title} Stock Analysis</title>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n\
         <div id=\"chart\" style=\"width:100%;height:800px;\"></div>\n\
         <script>\nPlotly.newPlot(\"chart\", {data}, {layout});\n</script>\n</body>\n</html>\n",
        title = escape_html(ticker),
        data = script_json(&data),
        layout = script_json(&layout),
    )
}

/// Write `{dir}/{ticker}_stock_analysis.html` and return its path.
pub fn write_html(dir: &Path, series: &PriceSeries, indicators: &IndicatorSeries) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create chart directory {}", dir.display()))?;

    let file_name: String = series
        .ticker()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{file_name}_stock_analysis.html"));

    std::fs::write(&path, render_html(series, indicators))
        .with_context(|| format!("failed to write chart to {}", path.display()))?;

    info!(ticker = series.ticker(), path = %path.display(), "chart written");
    Ok(path)
}
