// =============================================================================
// Analysis errors
// =============================================================================
//
// Only input and parameter validation fails an analysis. Indicators that lack
// enough samples are reported as absent fields instead of errors.

use thiserror::Error;

/// Reasons an `analyze` call is rejected outright.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("series is empty: at least one sample is required")]
    EmptySeries,

    #[error("invalid price at index {index}: {value} (must be finite and non-negative)")]
    InvalidPrice { index: usize, value: f64 },

    #[error("invalid high/low at index {index}: {reason}")]
    InvalidRange { index: usize, reason: String },

    #[error("invalid volume at index {index}: {value} (must be finite and non-negative)")]
    InvalidVolume { index: usize, value: f64 },

    #[error("volume series length {volumes} does not match price series length {prices}")]
    VolumeLengthMismatch { prices: usize, volumes: usize },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("score weights must sum to 1.0, got {sum:.12}")]
    WeightsDoNotSumToOne { sum: f64 },

    #[error("sub-score `{name}` must lie in [0, 1], got {value}")]
    SubScoreOutOfRange { name: &'static str, value: f64 },
}

impl AnalysisError {
    pub(crate) fn param(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = AnalysisError::InvalidPrice {
            index: 3,
            value: -1.0,
        };
        assert!(err.to_string().contains("index 3"));

        let err = AnalysisError::param("bb_k", "must be > 0");
        assert_eq!(err.to_string(), "invalid parameter `bb_k`: must be > 0");
    }
}
