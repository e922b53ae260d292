// =============================================================================
// Relative Strength Index (RSI) — simple-average form
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Split each delta into a gain (positive part) and a loss (magnitude
//          of the negative part).
// Step 3 — Average gains and losses over the trailing `period` deltas.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// The first delta belongs to close index 1, so the first complete window
// ends at close index `period`.
// =============================================================================

/// Aligned RSI series plus the number of windows that had no losses.
#[derive(Debug, Clone)]
pub struct RsiSeries {
    pub values: Vec<Option<f64>>,
    /// Windows whose average loss was zero; their RSI is 100.
    pub zero_loss_windows: usize,
}

/// Compute the RSI series for the given `closes` and `period`.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => every position `None`
/// - Average loss of zero (including a flat window) => RSI 100.0, counted in
///   `zero_loss_windows`.
pub fn calculate_rsi(closes: &[f64], period: usize) -> RsiSeries {
    let mut values = vec![None; closes.len()];
    let mut zero_loss_windows = 0;

    if period == 0 || closes.len() < period + 1 {
        return RsiSeries {
            values,
            zero_loss_windows,
        };
    }

    // --- Gains / losses per delta (index i-1 holds close[i] - close[i-1]) ---
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let d = w[1] - w[0];
            (d.max(0.0), (-d).max(0.0))
        })
        .unzip();

    let period_f = period as f64;
    let mut sum_gain: f64 = gains[..period].iter().sum();
    let mut sum_loss: f64 = losses[..period].iter().sum();

    for end in (period - 1)..gains.len() {
        if end >= period {
            sum_gain += gains[end] - gains[end - period];
            sum_loss += losses[end] - losses[end - period];
        }
        // Running sums can drift a hair below zero after subtraction.
        let avg_gain = sum_gain.max(0.0) / period_f;
        let avg_loss = sum_loss.max(0.0) / period_f;

        let rsi = if avg_loss <= f64::EPSILON * avg_gain.max(1.0) {
            zero_loss_windows += 1;
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        values[end + 1] = Some(rsi.clamp(0.0, 100.0));
    }

    RsiSeries {
        values,
        zero_loss_windows,
    }
}
