// =============================================================================
// Pipeline output types
// =============================================================================

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DegenerateMetric;

/// Canonical column names.  Every consumer reads columns through these so
/// that a name is spelled exactly one way.
pub mod columns {
    pub const MACD_LINE: &str = "MACD_Line";
    pub const SIGNAL_LINE: &str = "Signal_Line";
    pub const MACD_HISTOGRAM: &str = "MACD_Histogram";
    pub const DAILY_RETURNS: &str = "Daily_Returns";
    pub const ROLLING_VOLATILITY: &str = "Rolling_Volatility";
    pub const BB_MIDDLE: &str = "BB_Middle";
    pub const BB_UPPER: &str = "BB_Upper";
    pub const BB_LOWER: &str = "BB_Lower";
    pub const RSI: &str = "RSI";
    pub const Z_SCORE: &str = "Z_Score";
    pub const CUMULATIVE_RETURN: &str = "Cumulative_Return";
    pub const DRAWDOWN: &str = "Drawdown";

    pub fn sma(period: usize) -> String {
        format!("SMA_{period}")
    }

    pub fn ema(period: usize) -> String {
        format!("EMA_{period}")
    }
}

// =============================================================================
// IndicatorSeries
// =============================================================================

/// Named indicator columns aligned bar-for-bar with the source series.
///
/// `None` marks a position where the indicator's look-back window is not yet
/// satisfied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    timestamps: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorSeries {
    pub(crate) fn new(timestamps: Vec<DateTime<Utc>>) -> Self {
        Self {
            timestamps,
            columns: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.timestamps.len());
        self.columns.insert(name.into(), values);
    }

    /// Insert a column that is defined at every position.
    pub(crate) fn insert_dense(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.insert(name, values.into_iter().map(Some).collect());
    }

    pub fn get(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of column `name` at bar `index`, if both exist and it is defined.
    #[cfg(test)]
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.get(name)?.get(index).copied().flatten()
    }

    /// Value of column `name` at the last bar.
    #[cfg(test)]
    pub fn last(&self, name: &str) -> Option<f64> {
        self.value(name, self.len().checked_sub(1)?)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of bars (not columns).
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }
}

// =============================================================================
// PortfolioMetrics
// =============================================================================

/// Scalar summary of one ticker's analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    /// Mean annualised rolling volatility; NaN when no window was complete.
    pub volatility: f64,
    /// NaN when daily returns have no dispersion.
    pub sharpe_ratio: f64,
    /// Non-positive fraction.
    pub max_drawdown: f64,
    pub bars: usize,
    /// Sentinels substituted while computing this record.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degenerate: Vec<DegenerateMetric>,
}

/// Report label of the Sharpe row, the only metric that is not a fraction.
pub const SHARPE_ROW: &str = "Sharpe_Ratio";

impl PortfolioMetrics {
    pub fn has_sharpe(&self) -> bool {
        self.sharpe_ratio.is_finite()
    }

    /// `(label, value)` pairs in report order.
    pub fn rows(&self) -> [(&'static str, f64); 5] {
        [
            ("Total_Return", self.total_return),
            ("Annualized_Return", self.annualized_return),
            ("Volatility", self.volatility),
            (SHARPE_ROW, self.sharpe_ratio),
            ("Max_Drawdown", self.max_drawdown),
        ]
    }
}
