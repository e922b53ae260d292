// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The series is seeded with the first value, so it is defined from index 0
// and has the same length as its input.
// =============================================================================

/// Compute the EMA series for `values` and look-back `period`.
///
/// # Edge cases
/// - `period == 0` or empty input => empty vec
/// - A non-finite input poisons every later value; callers validate prices
///   before getting here.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev_ema = values[0];
    result.push(prev_ema);

    for &value in &values[1..] {
        let ema = value * multiplier + prev_ema * (1.0 - multiplier);
        result.push(ema);
        prev_ema = ema;
    }

    result
}
