// =============================================================================
// Equity Analyzer — Main Entry Point
// =============================================================================
//
// Fetches daily history for the configured tickers, runs the indicator
// pipeline on each, prints the portfolio metrics and writes one interactive
// chart per analysed ticker.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod chart;
mod config;
mod error;
mod indicators;
mod market_data;
mod pipeline;
mod provider;
mod report;
mod types;

use futures_util::future::join_all;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AnalyzerConfig;
use crate::provider::YahooClient;
use crate::report::TickerOutcome;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("ANALYZER_CONFIG").unwrap_or_else(|_| "analyzer_config.json".into());
    let mut config = AnalyzerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AnalyzerConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok())?;
    config.validate()?;

    info!(
        tickers = ?config.tickers,
        start = %config.start_date,
        end = %config.end_date,
        risk_free_rate = config.pipeline.risk_free_rate,
        "Analysis starting"
    );

    // ── 2. Fetch price history (concurrently, one request per ticker) ────
    let client = YahooClient::new(config.provider_base_url.clone())?;
    let fetches = config
        .tickers
        .iter()
        .map(|t| client.fetch_daily(t, config.start_date, config.end_date));
    let fetched: Vec<_> = config
        .tickers
        .iter()
        .cloned()
        .zip(join_all(fetches).await)
        .collect();

    // ── 3. Indicator pipeline per ticker ─────────────────────────────────
    let analyses = report::analyze_batch(fetched, &config.pipeline);

    // ── 4. Report ────────────────────────────────────────────────────────
    print!("{}", report::render_metrics_table(&analyses));

    // ── 5. Charts ────────────────────────────────────────────────────────
    if config.write_charts {
        for a in &analyses {
            if let TickerOutcome::Analysed {
                series, indicators, ..
            } = &a.outcome
            {
                if let Err(e) = chart::write_html(&config.output_dir, series, indicators) {
                    error!(ticker = %a.ticker, error = %e, "Failed to write chart");
                }
            }
        }
    }

    let analysed = analyses.iter().filter(|a| a.metrics().is_some()).count();
    info!(analysed, total = analyses.len(), "Analysis complete");
    Ok(())
}
