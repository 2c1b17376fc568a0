// =============================================================================
// Support / Resistance Extraction
// =============================================================================
//
// A sample at index `i` (with `r <= i < n - r`) is a:
//   - SUPPORT    if it holds the minimum of the symmetric window [i-r, i+r]
//   - RESISTANCE if it holds the maximum of that window
// and is the first index in scan order holding that value. Ties therefore
// resolve to the earliest sample and a flat stretch yields no pivot.
//
// Window extrema come from the O(n) monotonic-deque helpers in
// `indicators::rolling`: the trailing window ending at `i + r` is exactly the
// symmetric window centred on `i`.
//
// Strength grading is pluggable through `StrengthScorer`. The default scorer
// counts touches (other samples within a relative tolerance of the level) and
// upgrades a level whose pivot volume beats the series average.
//
// Closes are sorted once per detection, so every level's touch count is two
// binary searches and the volume average is computed a single time. Detection
// stays O(n log n) however many levels are requested.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::indicators::rolling::{rolling_max, rolling_min};
use crate::series::{TimeSeries, VolumeSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelKind {
    Support,
    Resistance,
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "support"),
            Self::Resistance => write!(f, "resistance"),
        }
    }
}

/// Qualitative strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    fn upgraded(self) -> Self {
        match self {
            Self::Weak => Self::Moderate,
            Self::Moderate | Self::Strong => Self::Strong,
        }
    }
}

/// A detected level. Levels are positional: two levels with the same kind and
/// price at different indices are distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub kind: LevelKind,
    pub price: f64,
    pub index: usize,
    pub timestamp: i64,
    /// Other samples within the touch tolerance of `price`.
    pub touches: usize,
    pub strength: Strength,
}

/// Everything a strength scorer may look at for one pivot.
#[derive(Debug, Clone, Copy)]
pub struct LevelContext<'a> {
    pub kind: LevelKind,
    pub index: usize,
    pub price: f64,
    pub touches: usize,
    pub closes: &'a [f64],
    pub volumes: Option<&'a [f64]>,
    /// Mean of `volumes`, computed once per detection.
    pub volume_mean: Option<f64>,
}

/// Grades a detected level.
pub trait StrengthScorer {
    fn grade(&self, ctx: &LevelContext<'_>) -> Strength;
}

/// Default grading: touches decide the base label, above-average pivot
/// volume upgrades it one step.
#[derive(Debug, Clone, Copy)]
pub struct TouchCountScorer {
    pub moderate_touches: usize,
    pub strong_touches: usize,
}

impl Default for TouchCountScorer {
    fn default() -> Self {
        Self {
            moderate_touches: 2,
            strong_touches: 4,
        }
    }
}

impl StrengthScorer for TouchCountScorer {
    fn grade(&self, ctx: &LevelContext<'_>) -> Strength {
        let base = if ctx.touches >= self.strong_touches {
            Strength::Strong
        } else if ctx.touches >= self.moderate_touches {
            Strength::Moderate
        } else {
            Strength::Weak
        };

        let volume_confirmed = ctx
            .volumes
            .zip(ctx.volume_mean)
            .is_some_and(|(vols, mean)| vols.get(ctx.index).is_some_and(|&v| v > mean));

        if volume_confirmed {
            base.upgraded()
        } else {
            base
        }
    }
}

/// Support/resistance extractor.
#[derive(Debug, Clone)]
pub struct ExtremaDetector<S = TouchCountScorer> {
    lookback: usize,
    max_levels: usize,
    touch_tolerance_pct: f64,
    scorer: S,
}

impl ExtremaDetector<TouchCountScorer> {
    pub fn new(lookback: usize, max_levels: usize, touch_tolerance_pct: f64) -> Self {
        Self::with_scorer(lookback, max_levels, touch_tolerance_pct, TouchCountScorer::default())
    }
}

impl<S: StrengthScorer> ExtremaDetector<S> {
    pub fn with_scorer(
        lookback: usize,
        max_levels: usize,
        touch_tolerance_pct: f64,
        scorer: S,
    ) -> Self {
        Self {
            lookback,
            max_levels,
            touch_tolerance_pct,
            scorer,
        }
    }

    /// Detect levels, returning at most `max_levels` of the most recent ones in
    /// chronological order. A series shorter than `2 * lookback + 1` yields no
    /// levels.
    pub fn detect(&self, series: &TimeSeries, volumes: Option<&VolumeSeries>) -> Vec<Level> {
        let closes = series.closes();
        let pivots = find_pivots(closes, self.lookback);
        if pivots.is_empty() {
            trace!(len = closes.len(), lookback = self.lookback, "no pivots detected");
            return Vec::new();
        }

        let skip = pivots.len().saturating_sub(self.max_levels);
        let volumes = volumes.map(VolumeSeries::values);
        let volume_mean = volumes.map(|v| v.iter().sum::<f64>() / v.len().max(1) as f64);
        let touch_index = TouchIndex::new(closes);
        let samples = series.samples();

        pivots[skip..]
            .iter()
            .map(|&(index, kind)| {
                let price = closes[index];
                let touches = touch_index.touches(price, self.touch_tolerance_pct);
                let strength = self.scorer.grade(&LevelContext {
                    kind,
                    index,
                    price,
                    touches,
                    closes,
                    volumes,
                    volume_mean,
                });
                Level {
                    kind,
                    price,
                    index,
                    timestamp: samples[index].timestamp,
                    touches,
                    strength,
                }
            })
            .collect()
    }
}

/// `(index, kind)` of every pivot in scan order.
fn find_pivots(closes: &[f64], lookback: usize) -> Vec<(usize, LevelKind)> {
    let window = 2 * lookback + 1;
    if lookback == 0 || closes.len() < window {
        return Vec::new();
    }

    let mins = rolling_min(closes, window);
    let maxs = rolling_max(closes, window);

    // Window `j` spans [j, j + 2r] and is centred on `j + r`.
    mins.iter()
        .zip(&maxs)
        .enumerate()
        .filter_map(|(j, (&(min_idx, _), &(max_idx, _)))| {
            let centre = j + lookback;
            if min_idx == centre {
                Some((centre, LevelKind::Support))
            } else if max_idx == centre {
                Some((centre, LevelKind::Resistance))
            } else {
                None
            }
        })
        .collect()
}

/// Closes in ascending order, queried by binary search.
struct TouchIndex {
    sorted: Vec<f64>,
}

impl TouchIndex {
    fn new(closes: &[f64]) -> Self {
        let mut sorted = closes.to_vec();
        sorted.sort_unstable_by(f64::total_cmp);
        Self { sorted }
    }

    /// Samples with `|close - price| <= tolerance`, minus the pivot itself.
    fn touches(&self, price: f64, tolerance_pct: f64) -> usize {
        let tolerance = price.abs() * tolerance_pct / 100.0;
        let below = self.sorted.partition_point(|&c| price - c > tolerance);
        let within = self.sorted.partition_point(|&c| c - price <= tolerance);
        within.saturating_sub(below).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// O(n·r) reference: scan each symmetric window directly.
    fn naive_pivots(closes: &[f64], r: usize) -> Vec<(usize, LevelKind)> {
        let mut out = Vec::new();
        if closes.len() < 2 * r + 1 {
            return out;
        }
        for i in r..closes.len() - r {
            let w = &closes[i - r..=i + r];
            let lo = w.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = w.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let first_lo = i - r + w.iter().position(|&x| x == lo).unwrap();
            let first_hi = i - r + w.iter().position(|&x| x == hi).unwrap();
            if first_lo == i {
                out.push((i, LevelKind::Support));
            } else if first_hi == i {
                out.push((i, LevelKind::Resistance));
            }
        }
        out
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + 10.0 * (i as f64 * 0.2).sin()).collect()
    }

    #[test]
    fn finds_troughs_and_peaks_of_a_wave() {
        let series = TimeSeries::from_prices(&wave(120)).unwrap();
        let levels = ExtremaDetector::new(5, 50, 0.5).detect(&series, None);
        assert!(levels.iter().any(|l| l.kind == LevelKind::Support));
        assert!(levels.iter().any(|l| l.kind == LevelKind::Resistance));
        for l in &levels {
            match l.kind {
                LevelKind::Support => assert!(l.price < 92.0, "{l:?}"),
                LevelKind::Resistance => assert!(l.price > 108.0, "{l:?}"),
            }
        }
    }

    #[test]
    fn deque_matches_naive_scan() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..10 {
            let n = rng.random_range(50..=400);
            let r = rng.random_range(1..=20);
            // Coarse integer prices force plenty of ties.
            let closes: Vec<f64> = (0..n).map(|_| rng.random_range(90..110) as f64).collect();
            assert_eq!(find_pivots(&closes, r), naive_pivots(&closes, r));
        }
    }

    #[test]
    fn ties_go_to_first_index() {
        // Two equal troughs inside one window: only the first qualifies.
        let closes = [5.0, 4.0, 1.0, 3.0, 1.0, 4.0, 5.0];
        let pivots = find_pivots(&closes, 2);
        assert_eq!(pivots, vec![(2, LevelKind::Support)]);
    }

    #[test]
    fn flat_series_has_no_levels() {
        let series = TimeSeries::from_prices(&[42.0; 50]).unwrap();
        assert!(ExtremaDetector::new(10, 10, 0.5).detect(&series, None).is_empty());
    }

    #[test]
    fn short_series_has_no_levels() {
        let series = TimeSeries::from_prices(&wave(20)).unwrap();
        assert!(ExtremaDetector::new(10, 10, 0.5).detect(&series, None).is_empty());
    }

    #[test]
    fn keeps_most_recent_levels_in_order() {
        let series = TimeSeries::from_prices(&wave(400)).unwrap();
        let all = ExtremaDetector::new(5, usize::MAX, 0.5).detect(&series, None);
        let recent = ExtremaDetector::new(5, 3, 0.5).detect(&series, None);
        assert!(all.len() > 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent, all[all.len() - 3..].to_vec());
        assert!(recent.windows(2).all(|w| w[0].index < w[1].index));
    }

    #[test]
    fn detection_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(3);
        let closes: Vec<f64> = (0..300).map(|_| rng.random_range(50.0..60.0)).collect();
        let series = TimeSeries::from_prices(&closes).unwrap();
        let detector = ExtremaDetector::new(10, 10, 0.5);
        assert_eq!(detector.detect(&series, None), detector.detect(&series, None));
    }

    #[test]
    fn equal_prices_at_different_indices_are_both_kept() {
        let closes: Vec<f64> = [3.0, 2.0, 1.0, 2.0, 3.0].repeat(4);
        let series = TimeSeries::from_prices(&closes).unwrap();
        let levels = ExtremaDetector::new(2, usize::MAX, 0.5).detect(&series, None);
        let supports: Vec<usize> = levels
            .iter()
            .filter(|l| l.kind == LevelKind::Support)
            .map(|l| l.index)
            .collect();
        assert_eq!(supports, vec![2, 7, 12, 17]);
        assert!(levels
            .iter()
            .filter(|l| l.kind == LevelKind::Support)
            .all(|l| l.price == 1.0));
    }

    fn context<'a>(
        closes: &'a [f64],
        touches: usize,
        volumes: Option<&'a [f64]>,
    ) -> LevelContext<'a> {
        LevelContext {
            kind: LevelKind::Support,
            index: 2,
            price: 1.0,
            touches,
            closes,
            volumes,
            volume_mean: volumes.map(|v| v.iter().sum::<f64>() / v.len() as f64),
        }
    }

    #[test]
    fn touches_and_volume_drive_strength() {
        let scorer = TouchCountScorer::default();
        let closes = [1.0; 5];
        let quiet = [1.0, 1.0, 1.0, 1.0, 1.0];
        let spike = [1.0, 1.0, 9.0, 1.0, 1.0];

        assert_eq!(scorer.grade(&context(&closes, 0, None)), Strength::Weak);
        assert_eq!(scorer.grade(&context(&closes, 2, None)), Strength::Moderate);
        assert_eq!(scorer.grade(&context(&closes, 5, None)), Strength::Strong);
        assert_eq!(scorer.grade(&context(&closes, 0, Some(&quiet[..]))), Strength::Weak);
        assert_eq!(scorer.grade(&context(&closes, 0, Some(&spike[..]))), Strength::Moderate);
    }

    #[test]
    fn custom_scorer_is_used() {
        struct AlwaysStrong;
        impl StrengthScorer for AlwaysStrong {
            fn grade(&self, _ctx: &LevelContext<'_>) -> Strength {
                Strength::Strong
            }
        }

        let series = TimeSeries::from_prices(&wave(120)).unwrap();
        let levels = ExtremaDetector::with_scorer(5, 10, 0.5, AlwaysStrong).detect(&series, None);
        assert!(!levels.is_empty());
        assert!(levels.iter().all(|l| l.strength == Strength::Strong));
    }

    #[test]
    fn touches_exclude_pivot() {
        let index = TouchIndex::new(&[100.0, 100.2, 99.9, 105.0]);
        assert_eq!(index.touches(100.0, 0.5), 2);
        assert_eq!(index.touches(105.0, 0.5), 0);
    }

    #[test]
    fn sorted_touch_counts_match_linear_scan() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..10 {
            let n = rng.random_range(20..=300);
            let tolerance_pct = rng.random_range(0.0..3.0);
            // Coarse prices put many samples right on the tolerance edge.
            let closes: Vec<f64> = (0..n).map(|_| rng.random_range(95..105) as f64).collect();
            let index = TouchIndex::new(&closes);

            for (pivot, &price) in closes.iter().enumerate() {
                let tolerance = price.abs() * tolerance_pct / 100.0;
                let expected = closes
                    .iter()
                    .enumerate()
                    .filter(|&(i, &c)| i != pivot && (c - price).abs() <= tolerance)
                    .count();
                assert_eq!(index.touches(price, tolerance_pct), expected);
            }
        }
    }

    #[test]
    fn every_sample_a_level_on_long_series() {
        // Alternating closes make every interior sample a pivot.
        let closes: Vec<f64> = (0..200_000).map(|i| if i % 2 == 0 { 1.0 } else { 2.0 }).collect();
        let volumes = VolumeSeries::new(vec![1.0; closes.len()]).unwrap();
        let series = TimeSeries::from_prices(&closes).unwrap();

        let levels = ExtremaDetector::new(1, usize::MAX, 0.5).detect(&series, Some(&volumes));
        assert_eq!(levels.len(), closes.len() - 2);
        assert!(levels.iter().all(|l| l.touches == 99_999));
        assert!(levels.iter().all(|l| l.strength == Strength::Strong));
    }
}
