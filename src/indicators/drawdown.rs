// =============================================================================
// Drawdown
// =============================================================================
//
//   peak_t     = max(close_0 .. close_t)
//   drawdown_t = (close_t - peak_t) / peak_t          (always <= 0)
//   max drawdown = min_t drawdown_t

/// Per-bar drawdown from the running peak, aligned to `closes`.
pub fn drawdown_series(closes: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    closes
        .iter()
        .map(|&c| {
            peak = peak.max(c);
            if peak > 0.0 {
                ((c - peak) / peak).min(0.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// Largest peak-to-trough decline as a non-positive fraction.
///
/// Returns `0.0` for an empty slice.
pub fn max_drawdown(closes: &[f64]) -> f64 {
    drawdown_series(closes).into_iter().fold(0.0, f64::min)
}
