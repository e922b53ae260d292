// =============================================================================
// Returns & Rolling Volatility
// =============================================================================
//
// Daily return:       r_t = (close_t - close_{t-1}) / close_{t-1}
// Cumulative return:  R_t = prod_{k<=t} (1 + r_k) - 1,   R_0 = 0
// Rolling volatility: sample σ of the trailing `window` returns * sqrt(base)
//
// r_0 has no previous close and is `None`; the first complete volatility
// window therefore ends at index `window`.

use super::stats::{sample_std, trailing_window};

/// Simple period-over-period returns, aligned to `closes`.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return result;
    }
    result.push(None);
    for w in closes.windows(2) {
        let prev = w[0];
        if prev == 0.0 {
            result.push(None);
        } else {
            result.push(Some((w[1] - prev) / prev));
        }
    }
    result
}

/// Running compounded return.  Undefined returns contribute a factor of 1.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<f64> {
    let mut growth = 1.0_f64;
    returns
        .iter()
        .map(|r| {
            if let Some(r) = r {
                growth *= 1.0 + r;
            }
            growth - 1.0
        })
        .collect()
}

/// Annualised rolling standard deviation of `returns`.
///
/// `annualization` is the number of periods per year (252 for daily bars).
/// A `window` below 2 has no sample deviation and yields all `None`.
pub fn rolling_volatility(returns: &[Option<f64>], window: usize, annualization: f64) -> Vec<Option<f64>> {
    let scale = annualization.sqrt();
    (0..returns.len())
        .map(|i| {
            if window < 2 {
                return None;
            }
            let values = trailing_window(returns, i, window)?;
            sample_std(&values).map(|s| s * scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_basic() {
        let r = daily_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 0.10).abs() < 1e-12);
        assert!((r[2].unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn returns_empty() {
        assert!(daily_returns(&[]).is_empty());
    }

    #[test]
    fn cumulative_matches_endpoint_ratio() {
        let closes = [100.0, 103.0, 97.5, 120.0, 111.1];
        let cum = cumulative_returns(&daily_returns(&closes));
        assert_eq!(cum[0], 0.0);
        assert!((cum[4] - (111.1 / 100.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn flat_series_has_zero_returns() {
        let r = daily_returns(&[100.0, 100.0, 100.0]);
        assert_eq!(r, vec![None, Some(0.0), Some(0.0)]);
        assert_eq!(cumulative_returns(&r), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn volatility_first_defined_at_window() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        let vol = rolling_volatility(&daily_returns(&closes), 20, 252.0);
        assert!(vol[..20].iter().all(Option::is_none));
        assert!(vol[20..].iter().all(|v| v.is_some_and(|x| x > 0.0)));
    }

    #[test]
    fn volatility_known_value() {
        // Returns alternate +a / -a => sample σ over an even window is known.
        let returns: Vec<Option<f64>> = std::iter::once(None)
            .chain((0..4).map(|i| Some(if i % 2 == 0 { 0.01 } else { -0.01 })))
            .collect();
        let vol = rolling_volatility(&returns, 4, 252.0);
        // mean 0, ss = 4 * 1e-4, var = 4e-4 / 3
        let expected = (4e-4_f64 / 3.0).sqrt() * 252.0_f64.sqrt();
        assert!((vol[4].unwrap() - expected).abs() < 1e-12);
    }
}
