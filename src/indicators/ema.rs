// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
//   k      = 2 / (period + 1)
//   ema_0  = SMA of the first `period` closes
//   ema_t  = close_t * k + ema_{t-1} * (1 - k)
//
// Output is aligned like the SMA: the first value belongs to the close at
// index `period - 1`.
// =============================================================================

use super::sma::calculate_sma;

/// EMA series for `closes`. Empty when `period == 0` or the input is shorter
/// than `period`; stops early if a value turns non-finite.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<f64> {
    let Some(&seed) = calculate_sma(&closes[..period.min(closes.len())], period).first() else {
        return Vec::new();
    };
    if !seed.is_finite() {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let tail = closes[period..].iter().scan(seed, |prev, &close| {
        *prev = close * k + *prev * (1.0 - k);
        Some(*prev)
    });

    std::iter::once(seed)
        .chain(tail)
        .take_while(|v| v.is_finite())
        .collect()
}

/// Most recent EMA value, `None` on insufficient data.
pub fn latest_ema(closes: &[f64], period: usize) -> Option<f64> {
    calculate_ema(closes, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn degenerate_inputs_are_empty() {
        assert!(calculate_ema(&[], 5).is_empty());
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
        assert!(calculate_ema(&[1.0, 2.0], 5).is_empty());
        assert_eq!(latest_ema(&[1.0, 2.0], 5), None);
    }

    #[test]
    fn window_of_full_length_is_just_the_seed() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 1);
        assert!((ema[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn three_period_hand_computed() {
        // seed = 2, k = 0.5: 0.5*4 + 0.5*2 = 3, then 0.5*5 + 0.5*3 = 4
        let ema = calculate_ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ema.len(), 3);
        assert!((ema[0] - 2.0).abs() < 1e-12);
        assert!((ema[1] - 3.0).abs() < 1e-12);
        assert!((ema[2] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn constant_series_stays_constant() {
        let ema = calculate_ema(&[7.5; 40], 12);
        assert!(ema.iter().all(|v| (v - 7.5).abs() < 1e-12));
    }

    #[test]
    fn ema_matches_reference_on_random_series() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..25 {
            let n = rng.random_range(50..=500);
            let period = rng.random_range(1..=50);
            let closes: Vec<f64> = (0..n).map(|_| rng.random_range(1.0..1000.0)).collect();

            let k = 2.0 / (period as f64 + 1.0);
            let mut reference = Vec::with_capacity(n);
            let mut prev = closes[..period].iter().sum::<f64>() / period as f64;
            reference.push(prev);
            for &c in &closes[period..] {
                prev = c * k + prev * (1.0 - k);
                reference.push(prev);
            }

            let ema = calculate_ema(&closes, period);
            assert_eq!(ema.len(), n - period + 1);
            for (a, b) in ema.iter().zip(&reference) {
                assert!((a - b).abs() < 1e-8, "{a} vs {b}");
            }
        }
    }
}
