// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ).  σ is the sample standard deviation of the
// same trailing close window that produced the middle band; all three bands
// read the close column.

use super::sma::calculate_sma;
use super::stats::sample_std;

/// Aligned band series; `None` until the first complete window.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands over `closes`.
///
/// Positions before index `period - 1` are `None` in every band.  A
/// `period` below 2 has no sample deviation, so every position is `None`.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let n = closes.len();
    let mut upper = vec![None; n];
    let mut lower = vec![None; n];

    if period < 2 {
        return BollingerBands {
            upper,
            middle: vec![None; n],
            lower,
        };
    }

    let middle = calculate_sma(closes, period);
    for i in (period - 1)..n {
        let Some(mid) = middle[i] else { continue };
        let Some(std_dev) = sample_std(&closes[i + 1 - period..=i]) else {
            continue;
        };
        upper[i] = Some(mid + num_std * std_dev);
        lower[i] = Some(mid - num_std * std_dev);
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
