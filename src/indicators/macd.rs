// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)        of close
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - Signal line
//
// All three EMAs are seeded at index 0, so every series is defined from the
// first bar.

use super::ema::calculate_ema;

/// Aligned MACD output.
#[derive(Debug, Clone)]
pub struct MacdResult {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Compute MACD with the given fast/slow/signal periods (12/26/9 by default
/// in the pipeline config).
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdResult {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = calculate_ema(&line, signal);
    let histogram = line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        line,
        signal,
        histogram,
    }
}
