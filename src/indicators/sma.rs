// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_t = mean(close_{t-period+1} ..= close_t)
//
// Backed by the O(n) rolling accumulator; the first value corresponds to the
// close at index `period - 1`.
// =============================================================================

use super::rolling::rolling_mean;

/// Compute the SMA series for `closes` and `period`.
///
/// Returns an empty `Vec` when `period == 0` or there are fewer than `period`
/// closes. Otherwise the result has `closes.len() - period + 1` entries.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(closes, period)
}

/// Most recent SMA value, `None` on insufficient data.
pub fn latest_sma(closes: &[f64], period: usize) -> Option<f64> {
    calculate_sma(closes, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn sma_known_values() {
        let closes = [1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = calculate_sma(&closes, 3);
        assert_eq!(sma.len(), 3);
        assert!((sma[0] - 2.0).abs() < 1e-12);
        assert!((sma[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sma_insufficient_data() {
        let closes: Vec<f64> = (1..=19).map(|x| x as f64).collect();
        assert!(calculate_sma(&closes, 20).is_empty());
        assert!(latest_sma(&closes, 20).is_none());
        assert!(calculate_sma(&closes, 0).is_empty());
    }

    #[test]
    fn sma_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..25 {
            let n = rng.random_range(50..=500);
            let period = rng.random_range(1..=200).min(n);
            let closes: Vec<f64> = (0..n).map(|_| rng.random_range(10.0..500.0)).collect();

            let fast = calculate_sma(&closes, period);
            assert_eq!(fast.len(), n - period + 1);
            for (i, v) in fast.iter().enumerate() {
                let reference = closes[i..i + period].iter().sum::<f64>() / period as f64;
                assert!((v - reference).abs() < 1e-8, "sma[{i}] {v} vs {reference}");
            }
        }
    }
}
