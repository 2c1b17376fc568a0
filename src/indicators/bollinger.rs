// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), with σ the population standard deviation of
// the window. The Band Width (BBW) is the normalised distance:
// BBW = (upper - lower) / middle * 100.
//
// Since σ >= 0 and k > 0, lower <= middle <= upper holds for every window;
// a constant window collapses all three bands onto the mean.

use serde::{Deserialize, Serialize};

use super::rolling::rolling_stats;

/// Bands for a single window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(upper - lower) / middle * 100`; absent when the middle band is zero.
    pub bandwidth: Option<f64>,
}

/// Bands for every window of `period` closes.
///
/// Returns an empty `Vec` when `period == 0` or there are fewer than `period`
/// closes. `num_std` is expected to be positive (validated by the engine).
pub fn calculate_bollinger_series(
    closes: &[f64],
    period: usize,
    num_std: f64,
) -> Vec<BollingerBands> {
    rolling_stats(closes, period)
        .into_iter()
        .map(|w| {
            let middle = w.mean;
            let offset = num_std * w.std_dev();
            let upper = middle + offset;
            let lower = middle - offset;
            let bandwidth = (middle != 0.0)
                .then(|| (upper - lower) / middle * 100.0)
                .filter(|bw| bw.is_finite());
            BollingerBands {
                upper,
                middle,
                lower,
                bandwidth,
            }
        })
        .collect()
}

/// Bands for the most recent window, `None` on insufficient data.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
    if period == 0 || closes.len() < period {
        return None;
    }
    calculate_bollinger_series(&closes[closes.len() - period..], period, num_std)
        .pop()
}
