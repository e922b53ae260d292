// =============================================================================
// Descriptive statistics shared by the indicators
// =============================================================================
//
// Sample statistics use the n-1 (Bessel) denominator, population statistics
// use n.  Rolling windows (Bollinger, volatility) and the Sharpe ratio use the
// sample form; the full-series z-score uses the population form so that the
// standardised series has unit population variance.

/// Arithmetic mean.  `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1).  `None` for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Population standard deviation (n).  `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    Some((ss / values.len() as f64).sqrt())
}

/// Collect the trailing `period` values ending at `end` (inclusive) if every
/// one of them is defined.
pub(crate) fn trailing_window(values: &[Option<f64>], end: usize, period: usize) -> Option<Vec<f64>> {
    if period == 0 || end + 1 < period {
        return None;
    }
    values[end + 1 - period..=end].iter().copied().collect()
}
