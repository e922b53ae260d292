// =============================================================================
// Yahoo Finance chart client — daily OHLCV history over HTTPS
// =============================================================================
//
// Public endpoint, no authentication:
//   GET {base}/v8/finance/chart/{ticker}?period1=..&period2=..&interval=1d
//
// The response carries parallel arrays (`timestamp`, and `open`/`high`/`low`/
// `close`/`volume` under `indicators.quote[0]`).  Entries for non-trading
// placeholders come back as `null` and are skipped.
// =============================================================================

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, instrument, warn};

use crate::market_data::{PriceBar, PriceSeries};

/// HTTP client for the chart-history endpoint.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent("equity-analyzer/1.0")
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// Daily bars for `ticker` from `start` (inclusive) to `end` (exclusive).
    #[instrument(skip(self), name = "yahoo::fetch_daily")]
    pub async fn fetch_daily(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let period1 = start.and_hms_opt(0, 0, 0).map_or(0, |d| d.and_utc().timestamp());
        let period2 = end.and_hms_opt(0, 0, 0).map_or(0, |d| d.and_utc().timestamp());
        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
            self.base_url, ticker, period1, period2
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET chart history for {ticker} failed"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {ticker}"))?;

        if !status.is_success() {
            anyhow::bail!("chart endpoint returned {} for {}: {}", status, ticker, body);
        }

        let series = parse_chart(ticker, &body)?;
        if series.is_empty() {
            warn!(ticker, %start, %end, "no trading days in requested range");
        }
        debug!(ticker, bars = series.len(), "daily history fetched");
        Ok(series)
    }
}

/// Convert a chart-endpoint JSON body into a validated [`PriceSeries`].
pub fn parse_chart(ticker: &str, body: &serde_json::Value) -> Result<PriceSeries> {
    let chart = body.get("chart").context("response has no `chart` object")?;

    if let Some(err) = chart.get("error").filter(|e| !e.is_null()) {
        anyhow::bail!("chart endpoint reported an error for {ticker}: {err}");
    }

    let result = chart
        .get("result")
        .and_then(|r| r.get(0))
        .context("chart response has no result")?;

    // An empty date range comes back without a `timestamp` key at all.
    let Some(timestamps) = result.get("timestamp").and_then(|t| t.as_array()) else {
        return Ok(PriceSeries::from_bars_unchecked(ticker, Vec::new()));
    };

    let quote = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0))
        .context("chart result has no quote block")?;

    let (open, high, low, close, volume) = (
        quote_column(quote, "open")?,
        quote_column(quote, "high")?,
        quote_column(quote, "low")?,
        quote_column(quote, "close")?,
        quote_column(quote, "volume")?,
    );

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let fields = (
            ts.as_i64().and_then(|s| DateTime::<Utc>::from_timestamp(s, 0)),
            open.get(i).and_then(|v| v.as_f64()),
            high.get(i).and_then(|v| v.as_f64()),
            low.get(i).and_then(|v| v.as_f64()),
            close.get(i).and_then(|v| v.as_f64()),
        );
        let (Some(timestamp), Some(o), Some(h), Some(l), Some(c)) = fields else {
            warn!(ticker, index = i, "skipping chart row with missing fields");
            continue;
        };
        let vol = volume.get(i).and_then(|v| v.as_f64()).unwrap_or(0.0);
        bars.push(PriceBar::new(timestamp, o, h, l, c, vol));
    }

    PriceSeries::new(ticker, bars).with_context(|| format!("provider returned an invalid series for {ticker}"))
}

fn quote_column<'a>(quote: &'a serde_json::Value, name: &str) -> Result<&'a Vec<serde_json::Value>> {
    quote
        .get(name)
        .and_then(|c| c.as_array())
        .with_context(|| format!("quote block has no `{name}` array"))
}
