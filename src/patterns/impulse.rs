// =============================================================================
// Trend-Impulse Classifier (Elliott-style proxy)
// =============================================================================
//
// Counts up-moves and down-moves among the period-over-period changes of the
// trailing window:
//
//   up   > ratio * down  (and up > 0)   => BULLISH_IMPULSE
//   down > ratio * up    (and down > 0) => BEARISH_IMPULSE
//   otherwise                           => UNKNOWN
//
// Unchanged closes count as neither. Confidence is the move imbalance
//
//   confidence = 100 * |up - down| / (up + down)
//
// which is 0 for a balanced window and 100 for a one-sided one. This is a
// heuristic label, not an Elliott Wave count.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    BullishImpulse,
    BearishImpulse,
    Unknown,
}

impl std::fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullishImpulse => write!(f, "bullish_impulse"),
            Self::BearishImpulse => write!(f, "bearish_impulse"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpulseReading {
    pub label: TrendLabel,
    /// Imbalance-derived confidence in [0, 100].
    pub confidence: f64,
    pub up_moves: usize,
    pub down_moves: usize,
}

/// Classify the trailing `window` closes.
pub fn classify_impulse(closes: &[f64], window: usize, ratio: f64) -> ImpulseReading {
    let start = closes.len().saturating_sub(window);
    let tail = &closes[start..];

    let (up_moves, down_moves) = tail.windows(2).fold((0usize, 0usize), |(up, down), w| {
        if w[1] > w[0] {
            (up + 1, down)
        } else if w[1] < w[0] {
            (up, down + 1)
        } else {
            (up, down)
        }
    });

    let up = up_moves as f64;
    let down = down_moves as f64;

    let label = if up_moves > 0 && up > ratio * down {
        TrendLabel::BullishImpulse
    } else if down_moves > 0 && down > ratio * up {
        TrendLabel::BearishImpulse
    } else {
        TrendLabel::Unknown
    };

    let total = up + down;
    let confidence = if total > 0.0 {
        100.0 * (up - down).abs() / total
    } else {
        0.0
    };

    ImpulseReading {
        label,
        confidence,
        up_moves,
        down_moves,
    }
}
