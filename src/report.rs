// =============================================================================
// Batch analysis & text report
// =============================================================================
//
// Runs the pipeline once per fetched ticker.  Each ticker's outcome stands on
// its own: a fetch failure or a pipeline rejection is recorded for that
// ticker and the rest of the batch proceeds.
// =============================================================================

use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::market_data::PriceSeries;
use crate::pipeline;
use crate::types::{IndicatorSeries, PortfolioMetrics, SHARPE_ROW};

/// What happened to one ticker in a batch.
#[derive(Debug, Serialize)]
#[serde(tag = "status")]
pub enum TickerOutcome {
    Analysed {
        #[serde(skip)]
        series: PriceSeries,
        #[serde(skip)]
        indicators: IndicatorSeries,
        metrics: PortfolioMetrics,
    },
    Rejected {
        #[serde(serialize_with = "serialize_display")]
        error: PipelineError,
    },
    FetchFailed {
        error: String,
    },
}

fn serialize_display<S: serde::Serializer>(err: &PipelineError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

#[derive(Debug, Serialize)]
pub struct TickerAnalysis {
    pub ticker: String,
    #[serde(flatten)]
    pub outcome: TickerOutcome,
}

impl TickerAnalysis {
    pub fn metrics(&self) -> Option<&PortfolioMetrics> {
        match &self.outcome {
            TickerOutcome::Analysed { metrics, .. } => Some(metrics),
            _ => None,
        }
    }
}

/// Analyse every `(ticker, fetch result)` pair independently, preserving order.
pub fn analyze_batch(fetched: Vec<(String, Result<PriceSeries>)>, config: &PipelineConfig) -> Vec<TickerAnalysis> {
    fetched
        .into_iter()
        .map(|(ticker, fetch)| {
            let outcome = match fetch {
                Err(e) => {
                    error!(ticker = %ticker, error = %format!("{e:#}"), "price history unavailable");
                    TickerOutcome::FetchFailed {
                        error: format!("{e:#}"),
                    }
                }
                Ok(series) => match pipeline::compute(&series, config) {
                    Ok((indicators, metrics)) => {
                        info!(
                            ticker = %ticker,
                            bars = metrics.bars,
                            total_return = metrics.total_return,
                            sharpe = metrics.sharpe_ratio,
                            "ticker analysed"
                        );
                        for d in &metrics.degenerate {
                            warn!(ticker = %ticker, metric = %d, "sentinel value substituted");
                        }
                        TickerOutcome::Analysed {
                            series,
                            indicators,
                            metrics,
                        }
                    }
                    Err(e) => {
                        warn!(ticker = %ticker, error = %e, "ticker rejected by pipeline");
                        TickerOutcome::Rejected { error: e }
                    }
                },
            };
            TickerAnalysis { ticker, outcome }
        })
        .collect()
}

/// Fraction as a percentage with two decimals; `n/a` for sentinels.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

/// Sharpe ratio as a plain two-decimal ratio; `n/a` when undefined.
fn format_sharpe(metrics: &PortfolioMetrics) -> String {
    if metrics.has_sharpe() {
        format!("{:.2}", metrics.sharpe_ratio)
    } else {
        "n/a".to_string()
    }
}

/// Human-readable metrics report for the whole batch.
pub fn render_metrics_table(analyses: &[TickerAnalysis]) -> String {
    let mut out = String::from("Portfolio Metrics:\n");

    for a in analyses {
        let _ = writeln!(out, "\n{} Performance:", a.ticker);
        match &a.outcome {
            TickerOutcome::Analysed { metrics, .. } => {
                for (label, value) in metrics.rows() {
                    let text = match label {
                        SHARPE_ROW => format_sharpe(metrics),
                        _ => format_percent(value),
                    };
                    let _ = writeln!(out, "{label}: {text}");
                }
                for d in &metrics.degenerate {
                    let _ = writeln!(out, "  note: {d}");
                }
            }
            TickerOutcome::Rejected { error } => {
                let _ = writeln!(out, "rejected: {error}");
            }
            TickerOutcome::FetchFailed { error } => {
                let _ = writeln!(out, "fetch failed: {error}");
            }
        }
    }

    out
}
