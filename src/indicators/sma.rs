// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t = (close_t + close_{t-1} + ... + close_{t-n+1}) / n
//
// The output is aligned to the input: the first `period - 1` positions have
// no complete window and are `None`.
// =============================================================================

/// Compute the SMA series for `values` with look-back `period`.
///
/// Uses a running sum so the cost is linear in the input length.
///
/// # Edge cases
/// - `period == 0` => every position `None`
/// - `values.len() < period` => every position `None`
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let period_f = period as f64;
    let mut sum: f64 = values[..period].iter().sum();
    result[period - 1] = Some(sum / period_f);

    for i in period..values.len() {
        sum += values[i] - values[i - period];
        result[i] = Some(sum / period_f);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_period_zero() {
        assert!(calculate_sma(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn sma_insufficient_data() {
        let sma = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(sma.len(), 2);
        assert!(sma.iter().all(Option::is_none));
    }

    #[test]
    fn sma_known_values() {
        let closes: Vec<f64> = (1..=6).map(|x| x as f64).collect();
        let sma = calculate_sma(&closes, 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        let expected = [2.0, 3.0, 4.0, 5.0];
        for (got, want) in sma[2..].iter().zip(expected.iter()) {
            assert!((got.unwrap() - want).abs() < 1e-10);
        }
    }

    #[test]
    fn sma_window_of_one_is_identity() {
        let closes = [3.0, 1.0, 4.0];
        let sma = calculate_sma(&closes, 1);
        assert_eq!(sma, vec![Some(3.0), Some(1.0), Some(4.0)]);
    }
}
