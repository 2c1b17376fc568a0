// =============================================================================
// Shared types used across the analysis engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Directional call of the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Risk label attached to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Where the high/low values behind a range-based indicator came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSource {
    /// Every sample carried a measured high and low.
    Measured,
    /// High/low derived from the close as `close * (1 ± spread_pct / 100)`.
    /// This is an approximation, not a measurement.
    SyntheticSpread { spread_pct: f64 },
}

impl RangeSource {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::SyntheticSpread { .. })
    }
}

/// Degraded computations surfaced alongside a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Approximation {
    /// High/low were synthesised from closing prices for ATR / stochastic.
    SyntheticHighLow,
    /// No volume series was supplied; volume-dependent logic used neutral
    /// defaults.
    VolumeUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialise_as_labels() {
        assert_eq!(serde_json::to_string(&Direction::Bullish).unwrap(), "\"BULLISH\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
        assert_eq!(
            serde_json::to_string(&Approximation::SyntheticHighLow).unwrap(),
            "\"synthetic_high_low\""
        );
    }

    #[test]
    fn range_source_tags() {
        let json = serde_json::to_value(RangeSource::SyntheticSpread { spread_pct: 2.0 }).unwrap();
        assert_eq!(json["kind"], "synthetic_spread");
        assert!(RangeSource::SyntheticSpread { spread_pct: 2.0 }.is_synthetic());
        assert!(!RangeSource::Measured.is_synthetic());
    }

    #[test]
    fn display_matches_wire_labels() {
        assert_eq!(Direction::Neutral.to_string(), "NEUTRAL");
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
    }
}
