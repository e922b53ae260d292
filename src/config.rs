// =============================================================================
// Analyzer Configuration — tickers, date range and pipeline parameters
// =============================================================================
//
// All fields carry `#[serde(default)]` so that a partial JSON file (or `{}`)
// still loads, with missing values taken from the defaults below.  Window
// lengths, the annualization base and the risk-free rate are configuration
// rather than constants; the defaults are the conventional daily-bar values.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_tickers() -> Vec<String> {
    vec!["AAPL".to_string(), "GOOGL".to_string(), "MSFT".to_string()]
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_sma_periods() -> Vec<usize> {
    vec![20, 50, 200]
}

fn default_ema_periods() -> Vec<usize> {
    vec![20, 50]
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_volatility_window() -> usize {
    20
}

fn default_bollinger_period() -> usize {
    20
}

fn default_band_std() -> f64 {
    2.0
}

fn default_rsi_period() -> usize {
    14
}

fn default_trading_days() -> f64 {
    252.0
}

fn default_risk_free_rate() -> f64 {
    0.02
}

fn default_min_bars() -> usize {
    2
}

// =============================================================================
// PipelineConfig
// =============================================================================

/// Parameters of the indicator pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Simple moving average windows; each produces an `SMA_<n>` column.
    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    /// Exponential moving average spans; each produces an `EMA_<n>` column.
    #[serde(default = "default_ema_periods")]
    pub ema_periods: Vec<usize>,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    /// Trailing window (in returns) for rolling volatility.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Band distance from the middle band in standard deviations.
    #[serde(default = "default_band_std")]
    pub band_std: f64,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Periods per year used for annualization.
    #[serde(default = "default_trading_days")]
    pub trading_days: f64,

    /// Annual risk-free rate subtracted in the Sharpe ratio.
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,

    /// Shortest series the pipeline accepts.  Values below 2 are raised to 2.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sma_periods: default_sma_periods(),
            ema_periods: default_ema_periods(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            volatility_window: default_volatility_window(),
            bollinger_period: default_bollinger_period(),
            band_std: default_band_std(),
            rsi_period: default_rsi_period(),
            trading_days: default_trading_days(),
            risk_free_rate: default_risk_free_rate(),
            min_bars: default_min_bars(),
        }
    }
}

impl PipelineConfig {
    /// Reject parameter combinations the pipeline cannot compute with.
    pub fn validate(&self) -> Result<()> {
        if self.sma_periods.iter().chain(self.ema_periods.iter()).any(|&p| p == 0) {
            bail!("moving average periods must be positive");
        }
        if self.macd_fast == 0 || self.macd_slow == 0 || self.macd_signal == 0 {
            bail!("MACD periods must be positive");
        }
        if self.volatility_window < 2 || self.bollinger_period < 2 {
            bail!("volatility and Bollinger windows need at least 2 values");
        }
        if self.rsi_period == 0 {
            bail!("RSI period must be positive");
        }
        if !self.band_std.is_finite() || self.band_std < 0.0 {
            bail!("band_std must be a non-negative number, got {}", self.band_std);
        }
        if !self.trading_days.is_finite() || self.trading_days <= 0.0 {
            bail!("trading_days must be positive, got {}", self.trading_days);
        }
        if !self.risk_free_rate.is_finite() {
            bail!("risk_free_rate must be finite");
        }
        Ok(())
    }
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Ticker symbols to analyse.
    #[serde(default = "default_tickers")]
    pub tickers: Vec<String>,

    /// First day of history (inclusive).
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last day of history (exclusive).
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    /// Directory that receives the per-ticker HTML charts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_true")]
    pub write_charts: bool,

    /// Base URL of the chart-history endpoint.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            tickers: default_tickers(),
            start_date: default_start_date(),
            end_date: default_end_date(),
            output_dir: default_output_dir(),
            write_charts: true,
            provider_base_url: default_provider_base_url(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        info!(
            path = %path.display(),
            tickers = ?config.tickers,
            start = %config.start_date,
            end = %config.end_date,
            "analyzer config loaded"
        );

        Ok(config)
    }

    /// Apply `ANALYZER_*` overrides from an environment lookup.
    ///
    /// Takes the lookup as a closure so tests do not touch process state.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(syms) = lookup("ANALYZER_TICKERS") {
            self.tickers = syms
                .split(',')
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(start) = lookup("ANALYZER_START") {
            self.start_date = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")
                .with_context(|| format!("ANALYZER_START is not a YYYY-MM-DD date: {start}"))?;
        }
        if let Some(end) = lookup("ANALYZER_END") {
            self.end_date = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")
                .with_context(|| format!("ANALYZER_END is not a YYYY-MM-DD date: {end}"))?;
        }
        if let Some(rate) = lookup("ANALYZER_RISK_FREE_RATE") {
            self.pipeline.risk_free_rate = rate
                .trim()
                .parse()
                .with_context(|| format!("ANALYZER_RISK_FREE_RATE is not a number: {rate}"))?;
        }
        if let Some(dir) = lookup("ANALYZER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tickers.is_empty() {
            bail!("no tickers configured");
        }
        if self.start_date >= self.end_date {
            bail!(
                "start_date {} must be before end_date {}",
                self.start_date,
                self.end_date
            );
        }
        self.pipeline.validate()
    }
}
