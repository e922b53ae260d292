use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One period's OHLCV record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Price-domain check for a single bar; `index` is only used for the error.
    fn check(&self, index: usize) -> Result<(), PipelineError> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PipelineError::invalid(
                    index,
                    format!("{name} must be a positive finite price, got {value}"),
                ));
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(PipelineError::invalid(
                index,
                format!("volume must be non-negative, got {}", self.volume),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PriceSeries
// ---------------------------------------------------------------------------

/// Time-ordered bars for a single ticker.
///
/// Bars are strictly ascending by timestamp with positive prices.  The
/// fields are private so a series obtained through [`PriceSeries::new`] is
/// always valid; [`PriceSeries::from_bars_unchecked`] exists for callers that
/// want the pipeline itself to report the problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a validated series.
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, PipelineError> {
        let series = Self::from_bars_unchecked(ticker, bars);
        series.validate()?;
        Ok(series)
    }

    /// Build a series without validation.
    pub fn from_bars_unchecked(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    /// Check ordering, uniqueness and price domain of every bar.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for (i, bar) in self.bars.iter().enumerate() {
            bar.check(i)?;
            if i > 0 {
                let prev = self.bars[i - 1].timestamp;
                if bar.timestamp == prev {
                    return Err(PipelineError::invalid(
                        i,
                        format!("duplicate timestamp {}", bar.timestamp),
                    ));
                }
                if bar.timestamp < prev {
                    return Err(PipelineError::invalid(
                        i,
                        format!("timestamp {} precedes {}", bar.timestamp, prev),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }
}


#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::test_support::series_from_closes;
    use super::*;

    fn bar(day: i64, close: f64) -> PriceBar {
        let ts = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap() + Duration::days(day);
        PriceBar::new(ts, close, close, close, close, 10.0)
    }

    #[test]
    fn valid_series_accepted() {
        let series = PriceSeries::new("AAPL", vec![bar(0, 1.0), bar(1, 2.0), bar(3, 3.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker(), "AAPL");
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn duplicate_timestamp_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(0, 1.0), bar(0, 2.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSeries { index: 1, .. }));
    }

    #[test]
    fn descending_timestamp_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(2, 1.0), bar(1, 2.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSeries { index: 1, .. }));
    }

    #[test]
    fn non_positive_close_rejected() {
        let err = PriceSeries::new("AAPL", vec![bar(0, 1.0), bar(1, 0.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSeries { index: 1, .. }));
    }

    #[test]
    fn negative_volume_rejected() {
        let mut b = bar(0, 1.0);
        b.volume = -1.0;
        assert!(PriceSeries::new("AAPL", vec![b]).is_err());
    }

    #[test]
    fn nan_price_rejected() {
        assert!(PriceSeries::new("AAPL", vec![bar(0, f64::NAN)]).is_err());
    }

    #[test]
    fn empty_series_is_valid_but_empty() {
        let series = PriceSeries::new("AAPL", Vec::new()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn helper_builds_ascending_series() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert!(series.validate().is_ok());
    }
}
