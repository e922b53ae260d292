// =============================================================================
// Indicator Pipeline
// =============================================================================
//
// Turns one ticker's price series into a fresh `IndicatorSeries` plus its
// `PortfolioMetrics`.  The function is pure: it reads the series and the
// config, never mutates either, and keeps no state between calls, so
// independent tickers can be computed on any thread.
//
// Rejections (`PipelineError`) cover inputs that cannot produce meaningful
// output.  Undefined ratios (zero-loss RSI windows, zero-dispersion Sharpe)
// are replaced by sentinels and listed in `PortfolioMetrics::degenerate`.
// =============================================================================

use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{DegenerateMetric, PipelineError};
use crate::indicators::bollinger::calculate_bollinger;
use crate::indicators::drawdown::{drawdown_series, max_drawdown};
use crate::indicators::ema::calculate_ema;
use crate::indicators::macd::calculate_macd;
use crate::indicators::returns::{cumulative_returns, daily_returns, rolling_volatility};
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::indicators::stats::{mean, sample_std};
use crate::indicators::zscore::calculate_zscore;
use crate::market_data::PriceSeries;
use crate::types::{columns, IndicatorSeries, PortfolioMetrics};

/// Compute every indicator column and the summary metrics for `series`.
///
/// # Errors
/// - [`PipelineError::InsufficientData`] when the series has fewer than
///   `config.min_bars` bars (never fewer than 2).
/// - [`PipelineError::InvalidSeries`] for duplicate or out-of-order
///   timestamps and non-positive prices.
/// - [`PipelineError::InvalidConfig`] when `config` fails
///   [`PipelineConfig::validate`], e.g. a zero period.
pub fn compute(
    series: &PriceSeries,
    config: &PipelineConfig,
) -> Result<(IndicatorSeries, PortfolioMetrics), PipelineError> {
    config
        .validate()
        .map_err(|e| PipelineError::InvalidConfig(format!("{e:#}")))?;

    let required = config.min_bars.max(2);
    if series.len() < required {
        return Err(PipelineError::InsufficientData {
            required,
            actual: series.len(),
        });
    }
    series.validate()?;

    let closes = series.closes();
    let mut out = IndicatorSeries::new(series.timestamps());
    let mut degenerate = Vec::new();

    // --- Trend ---------------------------------------------------------------
    for &period in &config.sma_periods {
        out.insert(columns::sma(period), calculate_sma(&closes, period));
    }
    for &period in &config.ema_periods {
        out.insert_dense(columns::ema(period), calculate_ema(&closes, period));
    }

    let macd = calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
    out.insert_dense(columns::MACD_LINE, macd.line);
    out.insert_dense(columns::SIGNAL_LINE, macd.signal);
    out.insert_dense(columns::MACD_HISTOGRAM, macd.histogram);

    // --- Returns & volatility -------------------------------------------------
    let returns = daily_returns(&closes);
    let rolling_vol = rolling_volatility(&returns, config.volatility_window, config.trading_days);
    let cumulative = cumulative_returns(&returns);

    // --- Bands & oscillators --------------------------------------------------
    let bands = calculate_bollinger(&closes, config.bollinger_period, config.band_std);
    out.insert(columns::BB_MIDDLE, bands.middle);
    out.insert(columns::BB_UPPER, bands.upper);
    out.insert(columns::BB_LOWER, bands.lower);

    let rsi = calculate_rsi(&closes, config.rsi_period);
    if rsi.zero_loss_windows > 0 {
        debug!(
            ticker = series.ticker(),
            windows = rsi.zero_loss_windows,
            "RSI windows without losses set to 100"
        );
        degenerate.push(DegenerateMetric::ZeroLossRsi {
            count: rsi.zero_loss_windows,
        });
    }
    out.insert(columns::RSI, rsi.values);

    let zscore = calculate_zscore(&closes);
    if zscore.flat {
        degenerate.push(DegenerateMetric::FlatZScore);
    }
    out.insert_dense(columns::Z_SCORE, zscore.values);

    let drawdown = drawdown_series(&closes);

    // --- Portfolio metrics ----------------------------------------------------
    let bars = closes.len();
    let total_return = cumulative.last().copied().unwrap_or(0.0);
    let annualized_return = (1.0 + total_return).powf(config.trading_days / bars as f64) - 1.0;

    let defined_vol: Vec<f64> = rolling_vol.iter().flatten().copied().collect();
    let volatility = mean(&defined_vol).unwrap_or_else(|| {
        degenerate.push(DegenerateMetric::NoVolatilityWindow);
        f64::NAN
    });

    let defined_returns: Vec<f64> = returns.iter().flatten().copied().collect();
    let sharpe_ratio = sharpe_ratio(&defined_returns, config.risk_free_rate, config.trading_days)
        .unwrap_or_else(|| {
            debug!(ticker = series.ticker(), "zero return dispersion, Sharpe undefined");
            degenerate.push(DegenerateMetric::ZeroVolatility);
            f64::NAN
        });

    out.insert(columns::DAILY_RETURNS, returns);
    out.insert(columns::ROLLING_VOLATILITY, rolling_vol);
    out.insert_dense(columns::CUMULATIVE_RETURN, cumulative);
    out.insert_dense(columns::DRAWDOWN, drawdown);

    let metrics = PortfolioMetrics {
        total_return,
        annualized_return,
        volatility,
        sharpe_ratio,
        max_drawdown: max_drawdown(&closes),
        bars,
        degenerate,
    };

    debug!(
        ticker = series.ticker(),
        bars,
        columns = out.names().count(),
        total_return = metrics.total_return,
        "indicator pipeline complete"
    );

    Ok((out, metrics))
}

/// Annualised excess return over annualised volatility of daily returns.
///
/// Returns `None` when the sample deviation is zero or undefined (fewer than
/// two returns).
fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, trading_days: f64) -> Option<f64> {
    let daily_mean = mean(returns)?;
    let daily_std = sample_std(returns)?;
    if daily_std <= 0.0 || !daily_std.is_finite() {
        return None;
    }
    let annualized_return = (1.0 + daily_mean).powf(trading_days) - 1.0;
    let annualized_volatility = daily_std * trading_days.sqrt();
    let ratio = (annualized_return - risk_free_rate) / annualized_volatility;
    ratio.is_finite().then_some(ratio)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::market_data::price_series::test_support::series_from_closes;
    use crate::market_data::PriceBar;

    /// Deterministic wavy series with drift; strictly positive.
    fn wavy(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + t * 0.1 + (t * 0.35).sin() * 6.0 + (t * 1.7).cos() * 2.0
            })
            .collect()
    }

    fn run(closes: &[f64]) -> (IndicatorSeries, PortfolioMetrics) {
        compute(&series_from_closes(closes), &PipelineConfig::default()).unwrap()
    }

    #[test]
    fn single_bar_is_insufficient() {
        let err = compute(&series_from_closes(&[100.0]), &PipelineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            PipelineError::InsufficientData {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn empty_series_is_insufficient() {
        let err = compute(&series_from_closes(&[]), &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { actual: 0, .. }));
    }

    #[test]
    fn configured_minimum_is_enforced() {
        let cfg = PipelineConfig {
            min_bars: 30,
            ..PipelineConfig::default()
        };
        let err = compute(&series_from_closes(&wavy(29)), &cfg).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { required: 30, actual: 29 }));
    }

    #[test]
    fn zero_periods_are_rejected_not_misaligned() {
        let series = series_from_closes(&wavy(30));
        let configs = [
            PipelineConfig {
                macd_signal: 0,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                macd_fast: 0,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                macd_slow: 0,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                ema_periods: vec![20, 0],
                ..PipelineConfig::default()
            },
        ];
        for cfg in &configs {
            let err = compute(&series, cfg).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidConfig(_)), "{cfg:?} gave {err:?}");
        }
    }

    #[test]
    fn invalid_config_checked_before_length() {
        let cfg = PipelineConfig {
            rsi_period: 0,
            ..PipelineConfig::default()
        };
        let err = compute(&series_from_closes(&[100.0]), &cfg).unwrap_err();
        assert!(err.to_string().contains("RSI period"));
    }

    #[test]
    fn every_column_matches_bar_count() {
        let cfg = PipelineConfig {
            ema_periods: vec![5, 10],
            sma_periods: vec![3],
            ..PipelineConfig::default()
        };
        let (ind, _) = compute(&series_from_closes(&wavy(45)), &cfg).unwrap();
        for name in ind.names() {
            assert_eq!(ind.get(name).unwrap().len(), 45, "{name}");
        }
    }

    #[test]
    fn duplicate_timestamp_is_invalid() {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let mut bars: Vec<PriceBar> = (0..10)
            .map(|i| PriceBar::new(start + Duration::days(i), 10.0, 10.0, 10.0, 10.0, 1.0))
            .collect();
        bars[5].timestamp = bars[4].timestamp;
        let series = PriceSeries::from_bars_unchecked("DUP", bars);
        let err = compute(&series, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSeries { index: 5, .. }));
    }

    #[test]
    fn flat_three_bar_example() {
        let (ind, m) = run(&[100.0, 100.0, 100.0]);
        assert_eq!(ind.get(columns::DAILY_RETURNS).unwrap(), &[None, Some(0.0), Some(0.0)]);
        assert_eq!(
            ind.get(columns::CUMULATIVE_RETURN).unwrap(),
            &[Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.total_return, 0.0);
        // Zero dispersion: Sharpe is a sentinel, not a crash.
        assert!(m.sharpe_ratio.is_nan());
        assert!(m.degenerate.contains(&DegenerateMetric::ZeroVolatility));
        assert!(m.degenerate.contains(&DegenerateMetric::NoVolatilityWindow));
        assert!(m.degenerate.contains(&DegenerateMetric::FlatZScore));
    }

    #[test]
    fn monotonic_decline_drawdown() {
        let (_, m) = run(&[100.0, 90.0, 80.0]);
        assert!((m.max_drawdown + 0.20).abs() < 1e-12);
    }

    #[test]
    fn rising_series_has_no_drawdown() {
        let closes: Vec<f64> = (1..=60).map(|x| 10.0 + x as f64).collect();
        let (ind, m) = run(&closes);
        assert_eq!(m.max_drawdown, 0.0);
        assert!(ind.get(columns::DRAWDOWN).unwrap().iter().all(|d| *d == Some(0.0)));
    }

    #[test]
    fn lookback_boundaries_on_long_series() {
        let closes = wavy(260);
        let (ind, _) = run(&closes);

        let check = |name: &str, first_defined: usize| {
            let col = ind.get(name).unwrap();
            assert!(col[..first_defined].iter().all(Option::is_none), "{name} defined too early");
            assert!(col[first_defined..].iter().all(Option::is_some), "{name} has gaps");
        };
        check("SMA_20", 19);
        check("SMA_50", 49);
        check("SMA_200", 199);
        check(columns::BB_MIDDLE, 19);
        check(columns::BB_UPPER, 19);
        check(columns::BB_LOWER, 19);
        check(columns::RSI, 14);
        check(columns::ROLLING_VOLATILITY, 20);
        check(columns::DAILY_RETURNS, 1);
        check("EMA_20", 0);
        check(columns::MACD_LINE, 0);
        check(columns::SIGNAL_LINE, 0);
        check(columns::MACD_HISTOGRAM, 0);
    }

    #[test]
    fn rsi_bounded() {
        let (ind, _) = run(&wavy(300));
        for v in ind.get(columns::RSI).unwrap().iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn cumulative_return_endpoints() {
        let closes = wavy(120);
        let (ind, m) = run(&closes);
        let cum = ind.get(columns::CUMULATIVE_RETURN).unwrap();
        assert_eq!(cum[0], Some(0.0));
        let expected = closes[119] / closes[0] - 1.0;
        assert!((cum[119].unwrap() - expected).abs() < 1e-10);
        assert!((m.total_return - expected).abs() < 1e-10);
    }

    #[test]
    fn zscore_moments() {
        let (ind, _) = run(&wavy(250));
        let z: Vec<f64> = ind.get(columns::Z_SCORE).unwrap().iter().flatten().copied().collect();
        assert_eq!(z.len(), 250);
        let m = z.iter().sum::<f64>() / 250.0;
        let var = z.iter().map(|v| (v - m).powi(2)).sum::<f64>() / 250.0;
        assert!(m.abs() < 1e-9);
        assert!((var.sqrt() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn metrics_follow_definitions() {
        let closes = wavy(200);
        let (ind, m) = run(&closes);
        let n = closes.len() as f64;

        let expected_ann = (1.0 + m.total_return).powf(252.0 / n) - 1.0;
        assert!((m.annualized_return - expected_ann).abs() < 1e-12);

        let vols: Vec<f64> = ind
            .get(columns::ROLLING_VOLATILITY)
            .unwrap()
            .iter()
            .flatten()
            .copied()
            .collect();
        let expected_vol = vols.iter().sum::<f64>() / vols.len() as f64;
        assert!((m.volatility - expected_vol).abs() < 1e-12);

        let rets: Vec<f64> = ind.get(columns::DAILY_RETURNS).unwrap().iter().flatten().copied().collect();
        let mu = rets.iter().sum::<f64>() / rets.len() as f64;
        let sd = (rets.iter().map(|r| (r - mu).powi(2)).sum::<f64>() / (rets.len() - 1) as f64).sqrt();
        let expected_sharpe = ((1.0 + mu).powf(252.0) - 1.0 - 0.02) / (sd * 252.0_f64.sqrt());
        assert!((m.sharpe_ratio - expected_sharpe).abs() < 1e-9);
        assert!(m.has_sharpe());
        assert!(m.max_drawdown <= 0.0);
        assert_eq!(m.bars, 200);
    }

    #[test]
    fn risk_free_rate_is_configurable() {
        let series = series_from_closes(&wavy(80));
        let base = compute(&series, &PipelineConfig::default()).unwrap().1;
        let cfg = PipelineConfig {
            risk_free_rate: 0.10,
            ..PipelineConfig::default()
        };
        let higher = compute(&series, &cfg).unwrap().1;
        assert!(higher.sharpe_ratio < base.sharpe_ratio);
    }

    #[test]
    fn no_look_ahead() {
        let closes = wavy(150);
        let (full, _) = run(&closes);
        let (prefix, _) = run(&closes[..100]);
        for name in [
            "SMA_20",
            "EMA_50",
            columns::MACD_HISTOGRAM,
            columns::RSI,
            columns::BB_LOWER,
            columns::ROLLING_VOLATILITY,
            columns::CUMULATIVE_RETURN,
            columns::DRAWDOWN,
        ] {
            let a = full.get(name).unwrap();
            let b = prefix.get(name).unwrap();
            for i in 0..100 {
                match (a[i], b[i]) {
                    (Some(x), Some(y)) => assert!((x - y).abs() < 1e-9, "{name}[{i}]"),
                    (None, None) => {}
                    other => panic!("{name}[{i}] mismatch: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let series = series_from_closes(&wavy(40));
        let before = series.clone();
        let _ = compute(&series, &PipelineConfig::default()).unwrap();
        assert_eq!(series, before);
    }

    #[test]
    fn rising_series_flags_zero_loss_rsi() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let (ind, m) = run(&closes);
        assert_eq!(ind.last(columns::RSI), Some(100.0));
        assert!(m
            .degenerate
            .iter()
            .any(|d| matches!(d, DegenerateMetric::ZeroLossRsi { count: 16 })));
    }
}
