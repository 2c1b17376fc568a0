// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   %K = 100 * (close - lowest_low(k)) / (highest_high(k) - lowest_low(k))
//   %D = SMA(%K, d)
//
// The lowest low / highest high come from the O(n) monotonic-deque rolling
// extrema. A zero-width range (flat market) yields %K = 50.

use serde::{Deserialize, Serialize};

use super::rolling::{rolling_max, rolling_min};
use super::sma::latest_sma;
use crate::series::TimeSeries;
use crate::types::RangeSource;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub range_source: RangeSource,
}

/// %K for every window of `k_period` bars. Empty on insufficient data or
/// mismatched slice lengths.
pub fn calculate_percent_k(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
) -> Vec<f64> {
    if highs.len() != closes.len() || lows.len() != closes.len() {
        return Vec::new();
    }

    let highest = rolling_max(highs, k_period);
    let lowest = rolling_min(lows, k_period);

    highest
        .iter()
        .zip(&lowest)
        .enumerate()
        .map(|(offset, (&(_, hh), &(_, ll)))| {
            let close = closes[offset + k_period - 1];
            let range = hh - ll;
            if range > 0.0 {
                (100.0 * (close - ll) / range).clamp(0.0, 100.0)
            } else {
                50.0
            }
        })
        .collect()
}

/// Latest %K / %D over a [`TimeSeries`]. Needs `k_period + d_period - 1`
/// samples.
pub fn stochastic_for_series(
    series: &TimeSeries,
    k_period: usize,
    d_period: usize,
    spread_pct: f64,
) -> Option<StochasticReading> {
    let (highs, lows, range_source) = series.high_low(spread_pct);
    let percent_k = calculate_percent_k(&highs, &lows, series.closes(), k_period);
    let k = *percent_k.last()?;
    let d = latest_sma(&percent_k, d_period)?;

    Some(StochasticReading { k, d, range_source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::Sample;

    #[test]
    fn percent_k_at_top_of_range() {
        let highs = [10.0, 11.0, 12.0];
        let lows = [8.0, 9.0, 10.0];
        let closes = [9.0, 10.0, 12.0];
        let k = calculate_percent_k(&highs, &lows, &closes, 3);
        assert_eq!(k.len(), 1);
        assert!((k[0] - 100.0).abs() < 1e-12);
    }

    #[test]
    fn percent_k_flat_range_is_midpoint() {
        let flat = [5.0; 6];
        assert!(calculate_percent_k(&flat, &flat, &flat, 3).iter().all(|&k| k == 50.0));
    }

    #[test]
    fn stochastic_needs_k_plus_d_minus_one_samples() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
        let series = TimeSeries::from_prices(&closes).unwrap();
        assert!(stochastic_for_series(&series, 14, 3, 2.0).is_some());

        let short = TimeSeries::from_prices(&closes[..15]).unwrap();
        assert!(stochastic_for_series(&short, 14, 3, 2.0).is_none());
    }

    #[test]
    fn stochastic_uses_measured_range_when_available() {
        let samples: Vec<Sample> = (0..20)
            .map(|i| {
                let p = 100.0 + i as f64;
                Sample::with_range(i, p, p + 1.0, p - 1.0)
            })
            .collect();
        let series = TimeSeries::new(samples).unwrap();
        let reading = stochastic_for_series(&series, 14, 3, 2.0).unwrap();
        assert_eq!(reading.range_source, RangeSource::Measured);
        assert!(reading.k > 80.0);
        assert!((0.0..=100.0).contains(&reading.d));
    }
}
