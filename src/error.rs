// =============================================================================
// Pipeline error taxonomy
// =============================================================================
//
// `PipelineError` rejects a whole ticker.  `DegenerateMetric` never rejects
// anything: it records where a sentinel value was substituted for an
// undefined ratio so the report layer can flag it.
// =============================================================================

use serde::Serialize;
use thiserror::Error;

/// Reasons the pipeline refuses to analyse a price series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// Not enough bars to produce any meaningful output.
    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Ordering, duplicate or price-domain violation at `index`.
    #[error("invalid series at bar {index}: {reason}")]
    InvalidSeries { index: usize, reason: String },

    /// Pipeline parameters that cannot produce aligned columns.
    #[error("invalid pipeline config: {0}")]
    InvalidConfig(String),
}

impl PipelineError {
    pub fn invalid(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidSeries {
            index,
            reason: reason.into(),
        }
    }
}

/// A metric whose denominator vanished and was replaced by a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum DegenerateMetric {
    /// Daily returns have zero standard deviation; Sharpe ratio is NaN.
    ZeroVolatility,
    /// RSI windows with zero average loss; each was set to 100.
    ZeroLossRsi { count: usize },
    /// Series too short for any rolling-volatility window; volatility is NaN.
    NoVolatilityWindow,
    /// Close prices are constant; every z-score was set to 0.
    FlatZScore,
}

impl std::fmt::Display for DegenerateMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroVolatility => write!(f, "zero return volatility (Sharpe undefined)"),
            Self::ZeroLossRsi { count } => write!(f, "{count} RSI window(s) without losses (set to 100)"),
            Self::NoVolatilityWindow => write!(f, "no complete volatility window"),
            Self::FlatZScore => write!(f, "constant closes (z-score set to 0)"),
        }
    }
}
