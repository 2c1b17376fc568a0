// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
//   gain_t / loss_t  positive / negative part of close_t - close_{t-1}
//   seed             plain mean of the first `period` gains and losses
//   avg_t            (avg_{t-1} * (period - 1) + x_t) / period
//   RSI              100 - 100 / (1 + avg_gain / avg_loss)
//
// The seed is the only windowed mean; every later value is Wilder-smoothed.
// Zones: above 70 overbought, below 30 oversold.
// =============================================================================

use serde::{Deserialize, Serialize};

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Position of the latest RSI relative to the classic thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiZone {
    pub fn of(rsi: f64) -> Self {
        if rsi > OVERBOUGHT {
            Self::Overbought
        } else if rsi < OVERSOLD {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

/// RSI for every close from index `period` on, so `closes.len() - period`
/// values. Empty when `period == 0` or fewer than `period + 1` closes.
///
/// A window with gains but no losses reads exactly 100; a window with no
/// movement at all reads 50.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let n = period as f64;
    let mut avg = (
        gains[..period].iter().sum::<f64>() / n,
        losses[..period].iter().sum::<f64>() / n,
    );

    let mut out = Vec::with_capacity(gains.len() + 1 - period);
    out.extend(rsi_from_averages(avg.0, avg.1));

    for (&gain, &loss) in gains[period..].iter().zip(&losses[period..]) {
        if out.is_empty() {
            break;
        }
        avg.0 = (avg.0 * (n - 1.0) + gain) / n;
        avg.1 = (avg.1 * (n - 1.0) + loss) / n;
        match rsi_from_averages(avg.0, avg.1) {
            Some(rsi) => out.push(rsi),
            None => break,
        }
    }

    out
}

/// Most recent RSI value, `None` on insufficient data.
pub fn latest_rsi(closes: &[f64], period: usize) -> Option<f64> {
    calculate_rsi(closes, period).last().copied()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = match (avg_gain > 0.0, avg_loss > 0.0) {
        (false, false) => 50.0,
        (true, false) => 100.0,
        _ => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    };
    rsi.is_finite().then(|| rsi.clamp(0.0, 100.0))
}
