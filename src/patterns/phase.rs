// =============================================================================
// Phase Classifier (Wyckoff-style proxy)
// =============================================================================
//
// Compares the trailing range against the trailing mean price:
//
//   relative_range = (max - min) / mean
//
//   relative_range > trending threshold       => TRENDING
//   relative_range < consolidating threshold  => CONSOLIDATING
//   otherwise                                 => TRANSITIONAL
//
// Defaults: trending 10%, consolidating 2%. A heuristic label only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseLabel {
    Trending,
    Consolidating,
    Transitional,
    InsufficientData,
}

impl std::fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trending => write!(f, "trending"),
            Self::Consolidating => write!(f, "consolidating"),
            Self::Transitional => write!(f, "transitional"),
            Self::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseReading {
    pub label: PhaseLabel,
    /// `(max - min) / mean` of the trailing window, as a fraction.
    pub relative_range: Option<f64>,
}

/// Classify the trailing `window` closes. Thresholds are fractions
/// (0.10 == 10%).
pub fn classify_phase(
    closes: &[f64],
    window: usize,
    trending_threshold: f64,
    consolidating_threshold: f64,
) -> PhaseReading {
    let start = closes.len().saturating_sub(window);
    let tail = &closes[start..];
    if tail.len() < 2 {
        return PhaseReading {
            label: PhaseLabel::InsufficientData,
            relative_range: None,
        };
    }

    let max = tail.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = tail.iter().cloned().fold(f64::INFINITY, f64::min);
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;

    // Prices are non-negative, so a zero mean means an all-zero window.
    let relative_range = if mean > 0.0 { (max - min) / mean } else { 0.0 };

    let label = if relative_range > trending_threshold {
        PhaseLabel::Trending
    } else if relative_range < consolidating_threshold {
        PhaseLabel::Consolidating
    } else {
        PhaseLabel::Transitional
    };

    PhaseReading {
        label,
        relative_range: Some(relative_range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_range_is_trending() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 2.0).collect();
        assert_eq!(classify_phase(&closes, 20, 0.10, 0.02).label, PhaseLabel::Trending);
    }

    #[test]
    fn tight_range_is_consolidating() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64 * 0.5).collect();
        let r = classify_phase(&closes, 20, 0.10, 0.02);
        assert_eq!(r.label, PhaseLabel::Consolidating);
        assert!(r.relative_range.unwrap() < 0.02);
    }

    #[test]
    fn middle_range_is_transitional() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64 * 5.0).collect();
        assert_eq!(classify_phase(&closes, 20, 0.10, 0.02).label, PhaseLabel::Transitional);
    }

    #[test]
    fn only_trailing_window_counts() {
        let mut closes: Vec<f64> = vec![10.0, 500.0];
        closes.extend(std::iter::repeat(100.0).take(20));
        assert_eq!(classify_phase(&closes, 20, 0.10, 0.02).label, PhaseLabel::Consolidating);
    }

    #[test]
    fn degenerate_inputs() {
        assert_eq!(classify_phase(&[1.0], 20, 0.10, 0.02).label, PhaseLabel::InsufficientData);
        let zeros = classify_phase(&[0.0; 5], 20, 0.10, 0.02);
        assert_eq!(zeros.label, PhaseLabel::Consolidating);
        assert_eq!(zeros.relative_range, Some(0.0));
    }
}
