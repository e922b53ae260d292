// Full-series z-score: (close - mean) / σ_pop over the whole input, not a
// rolling window.

use super::stats::{mean, population_std};

/// Standardised closes plus a flag set when σ is zero (every score is 0).
#[derive(Debug, Clone)]
pub struct ZScoreSeries {
    pub values: Vec<f64>,
    pub flat: bool,
}

pub fn calculate_zscore(closes: &[f64]) -> ZScoreSeries {
    let (Some(m), Some(sd)) = (mean(closes), population_std(closes)) else {
        return ZScoreSeries {
            values: Vec::new(),
            flat: false,
        };
    };

    if sd <= f64::EPSILON * m.abs().max(1.0) {
        return ZScoreSeries {
            values: vec![0.0; closes.len()],
            flat: true,
        };
    }

    ZScoreSeries {
        values: closes.iter().map(|c| (c - m) / sd).collect(),
        flat: false,
    }
}
