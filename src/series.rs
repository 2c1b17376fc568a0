// =============================================================================
// Time Series — validated price / volume input
// =============================================================================
//
// A `TimeSeries` is built once from raw samples and never mutated. The
// constructor rejects non-finite or negative values so that every indicator
// downstream can assume clean input. Timestamps are carried as-is; ordering is
// positional and duplicates are allowed.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::RangeSource;

/// A single observation. `high` / `low` are optional; when absent, range-based
/// indicators fall back to a synthetic spread around `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self {
            timestamp,
            price,
            high: None,
            low: None,
        }
    }

    pub fn with_range(timestamp: i64, price: f64, high: f64, low: f64) -> Self {
        Self {
            timestamp,
            price,
            high: Some(high),
            low: Some(low),
        }
    }
}

/// Ordered, validated sequence of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    samples: Vec<Sample>,
    closes: Vec<f64>,
}

impl TimeSeries {
    /// Validate and wrap `samples`. An empty series is a valid value; callers
    /// that need data (such as `analyze`) reject it themselves.
    pub fn new(samples: Vec<Sample>) -> Result<Self, AnalysisError> {
        for (index, s) in samples.iter().enumerate() {
            if !is_valid_amount(s.price) {
                return Err(AnalysisError::InvalidPrice {
                    index,
                    value: s.price,
                });
            }
            validate_range(index, s)?;
        }

        let closes = samples.iter().map(|s| s.price).collect();
        Ok(Self { samples, closes })
    }

    /// Build a series from bare prices, using the position as timestamp.
    pub fn from_prices(prices: &[f64]) -> Result<Self, AnalysisError> {
        Self::new(
            prices
                .iter()
                .enumerate()
                .map(|(i, &p)| Sample::new(i as i64, p))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Closing prices in series order.
    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// True when every sample carries a measured high and low.
    pub fn has_measured_range(&self) -> bool {
        !self.samples.is_empty()
            && self
                .samples
                .iter()
                .all(|s| s.high.is_some() && s.low.is_some())
    }

    /// High and low sequences for range-based indicators.
    ///
    /// Uses the measured values when every sample has them. Otherwise each
    /// bar is approximated as `close * (1 ± spread_pct / 100)` and the
    /// returned [`RangeSource`] says so.
    pub fn high_low(&self, spread_pct: f64) -> (Vec<f64>, Vec<f64>, RangeSource) {
        if self.has_measured_range() {
            let highs = self.samples.iter().map(|s| s.high.unwrap_or(s.price)).collect();
            let lows = self.samples.iter().map(|s| s.low.unwrap_or(s.price)).collect();
            return (highs, lows, RangeSource::Measured);
        }

        let factor = spread_pct / 100.0;
        let highs = self.closes.iter().map(|c| c * (1.0 + factor)).collect();
        let lows = self.closes.iter().map(|c| c * (1.0 - factor)).collect();
        (highs, lows, RangeSource::SyntheticSpread { spread_pct })
    }
}

/// Volumes parallel to a [`TimeSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSeries {
    values: Vec<f64>,
}

impl VolumeSeries {
    pub fn new(values: Vec<f64>) -> Result<Self, AnalysisError> {
        if let Some((index, &value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !is_valid_amount(**v))
        {
            return Err(AnalysisError::InvalidVolume { index, value });
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Reject a volume series that does not line up with `series`.
    pub fn ensure_aligned(&self, series: &TimeSeries) -> Result<(), AnalysisError> {
        if self.values.len() != series.len() {
            return Err(AnalysisError::VolumeLengthMismatch {
                prices: series.len(),
                volumes: self.values.len(),
            });
        }
        Ok(())
    }
}

fn is_valid_amount(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

fn validate_range(index: usize, s: &Sample) -> Result<(), AnalysisError> {
    let invalid = |reason: String| AnalysisError::InvalidRange { index, reason };

    if let Some(h) = s.high {
        if !is_valid_amount(h) {
            return Err(invalid(format!("high {h} must be finite and non-negative")));
        }
    }
    if let Some(l) = s.low {
        if !is_valid_amount(l) {
            return Err(invalid(format!("low {l} must be finite and non-negative")));
        }
    }
    if let (Some(h), Some(l)) = (s.high, s.low) {
        if l > h {
            return Err(invalid(format!("low {l} exceeds high {h}")));
        }
    }
    Ok(())
}
