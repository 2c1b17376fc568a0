// =============================================================================
// Pattern Heuristics Module
// =============================================================================
//
// Two independent, deliberately simple classifiers over the trailing window:
// - Trend impulse (up-move vs down-move imbalance)
// - Phase (trailing range relative to trailing mean)
//
// Neither is a real Elliott Wave or Wyckoff analysis. The only contract is
// determinism: the same input always yields the same labels and confidence.

pub mod impulse;
pub mod phase;

use serde::{Deserialize, Serialize};

pub use impulse::{classify_impulse, ImpulseReading, TrendLabel};
pub use phase::{classify_phase, PhaseLabel, PhaseReading};

fn default_window() -> usize {
    20
}

fn default_impulse_ratio() -> f64 {
    1.5
}

fn default_trending_range_pct() -> f64 {
    10.0
}

fn default_consolidating_range_pct() -> f64 {
    2.0
}

/// Tunables for both classifiers. Range thresholds are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_window")]
    pub window: usize,

    /// Up/down move ratio required for an impulse label.
    #[serde(default = "default_impulse_ratio")]
    pub impulse_ratio: f64,

    #[serde(default = "default_trending_range_pct")]
    pub trending_range_pct: f64,

    #[serde(default = "default_consolidating_range_pct")]
    pub consolidating_range_pct: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            impulse_ratio: default_impulse_ratio(),
            trending_range_pct: default_trending_range_pct(),
            consolidating_range_pct: default_consolidating_range_pct(),
        }
    }
}

/// Combined output of both classifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub trend_label: TrendLabel,
    pub trend_confidence: f64,
    pub up_moves: usize,
    pub down_moves: usize,
    pub phase_label: PhaseLabel,
    pub relative_range: Option<f64>,
}

/// Run both classifiers over `closes`.
pub fn analyze_patterns(closes: &[f64], config: &PatternConfig) -> PatternReport {
    let impulse = classify_impulse(closes, config.window, config.impulse_ratio);
    let phase = classify_phase(
        closes,
        config.window,
        config.trending_range_pct / 100.0,
        config.consolidating_range_pct / 100.0,
    );

    PatternReport {
        trend_label: impulse.label,
        trend_confidence: impulse.confidence,
        up_moves: impulse.up_moves,
        down_moves: impulse.down_moves,
        phase_label: phase.label,
        relative_range: phase.relative_range,
    }
}
