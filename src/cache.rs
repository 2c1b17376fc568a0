// =============================================================================
// Report Cache — bounded, single writer per key
// =============================================================================
//
// Keys are 64-bit fingerprints of a full request (samples, volumes, market
// inputs, params). Each key owns a slot guarded by its own mutex, so
// concurrent identical requests wait on the first one instead of computing
// the same report twice. The slot map itself sits behind a read-mostly
// `RwLock`.
//
// Eviction is FIFO by insertion order. A failed analysis gives its slot back,
// so errors never occupy capacity or push out stored reports.
// =============================================================================

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::engine::{AnalysisParams, AnalysisReport};
use crate::error::AnalysisError;
use crate::scoring::MarketInputs;
use crate::series::Sample;

type Slot = Arc<Mutex<Option<Arc<AnalysisReport>>>>;

pub struct ReportCache {
    capacity: usize,
    slots: RwLock<HashMap<u64, Slot>>,
    order: Mutex<VecDeque<u64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ReportCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: RwLock::new(HashMap::with_capacity(capacity)),
            order: Mutex::new(VecDeque::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Return the cached report for `key`, or run `compute` and store its
    /// result. The flag is `true` when the report came from the cache.
    pub fn get_or_compute<F>(
        &self,
        key: u64,
        compute: F,
    ) -> Result<(Arc<AnalysisReport>, bool), AnalysisError>
    where
        F: FnOnce() -> Result<AnalysisReport, AnalysisError>,
    {
        if self.capacity == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute().map(|report| (Arc::new(report), false));
        }

        let slot = self.slot(key);
        let mut guard = slot.lock();

        if let Some(report) = guard.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((Arc::clone(report), true));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let report = match compute() {
            Ok(report) => Arc::new(report),
            Err(err) => {
                self.release(key, &slot);
                return Err(err);
            }
        };
        *guard = Some(Arc::clone(&report));
        Ok((report, false))
    }

    /// Drop the empty slot for `key` if it is still the one in the map.
    /// Lock order matches `slot`: map first, then the FIFO order.
    fn release(&self, key: u64, slot: &Slot) {
        let mut slots = self.slots.write();
        if slots.get(&key).is_some_and(|held| Arc::ptr_eq(held, slot)) {
            slots.remove(&key);
            self.order.lock().retain(|&k| k != key);
            debug!(key, "report cache released failed slot");
        }
    }

    fn slot(&self, key: u64) -> Slot {
        if let Some(slot) = self.slots.read().get(&key) {
            return Arc::clone(slot);
        }

        let mut slots = self.slots.write();
        if let Some(slot) = slots.get(&key) {
            return Arc::clone(slot);
        }

        let slot: Slot = Arc::new(Mutex::new(None));
        slots.insert(key, Arc::clone(&slot));

        let mut order = self.order.lock();
        order.push_back(key);
        while order.len() > self.capacity {
            if let Some(oldest) = order.pop_front() {
                slots.remove(&oldest);
                debug!(key = oldest, "report cache evicted");
            }
        }

        slot
    }
}

/// Stable-within-process fingerprint of one analysis request.
pub fn fingerprint(
    samples: &[Sample],
    volumes: Option<&[f64]>,
    market: &MarketInputs,
    params: &AnalysisParams,
) -> u64 {
    let mut h = DefaultHasher::new();

    samples.len().hash(&mut h);
    for s in samples {
        s.timestamp.hash(&mut h);
        s.price.to_bits().hash(&mut h);
        s.high.map(f64::to_bits).hash(&mut h);
        s.low.map(f64::to_bits).hash(&mut h);
    }

    volumes.map(|v| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>()).hash(&mut h);

    market.sentiment.map(f64::to_bits).hash(&mut h);
    market.institutional_interest.map(f64::to_bits).hash(&mut h);
    market.market_cap.map(f64::to_bits).hash(&mut h);

    params.sma_periods.hash(&mut h);
    params.ema_periods.hash(&mut h);
    params.rsi_period.hash(&mut h);
    params.stochastic.k.hash(&mut h);
    params.stochastic.d.hash(&mut h);
    params.bb_period.hash(&mut h);
    params.bb_k.to_bits().hash(&mut h);
    params.atr_period.hash(&mut h);
    params.atr_spread_pct.to_bits().hash(&mut h);
    params.volatility_window.hash(&mut h);
    params.sr_lookback.hash(&mut h);
    params.max_levels.hash(&mut h);
    params.touch_tolerance_pct.to_bits().hash(&mut h);

    let pattern = &params.pattern;
    pattern.window.hash(&mut h);
    pattern.impulse_ratio.to_bits().hash(&mut h);
    pattern.trending_range_pct.to_bits().hash(&mut h);
    pattern.consolidating_range_pct.to_bits().hash(&mut h);

    let weights = &params.weights;
    for w in [weights.technical, weights.fundamental, weights.sentiment, weights.structure] {
        w.to_bits().hash(&mut h);
    }

    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::analyze;
    use crate::series::TimeSeries;
    use std::sync::atomic::AtomicUsize;

    fn report(n: usize) -> AnalysisReport {
        let prices: Vec<f64> = (0..n).map(|i| 10.0 + i as f64).collect();
        let series = TimeSeries::from_prices(&prices).unwrap();
        analyze(&series, None, &MarketInputs::default(), &AnalysisParams::default()).unwrap()
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = ReportCache::new(4);
        let (first, cached) = cache.get_or_compute(1, || Ok(report(5))).unwrap();
        assert!(!cached);
        let (second, cached) = cache
            .get_or_compute(1, || panic!("must not recompute"))
            .unwrap();
        assert!(cached);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!((cache.hits(), cache.misses()), (1, 1));
    }

    #[test]
    fn concurrent_identical_requests_compute_once() {
        let cache = ReportCache::new(8);
        let calls = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cache
                        .get_or_compute(42, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(report(30))
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn oldest_entry_is_evicted_first() {
        let cache = ReportCache::new(2);
        for key in 1..=3 {
            cache.get_or_compute(key, || Ok(report(3))).unwrap();
        }
        assert_eq!(cache.len(), 2);

        let (_, cached) = cache.get_or_compute(1, || Ok(report(3))).unwrap();
        assert!(!cached, "key 1 should have been evicted");
        let (_, cached) = cache.get_or_compute(3, || Ok(report(3))).unwrap();
        assert!(cached);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ReportCache::new(2);
        let err = cache.get_or_compute(7, || Err(AnalysisError::EmptySeries));
        assert_eq!(err.unwrap_err(), AnalysisError::EmptySeries);

        let (_, cached) = cache.get_or_compute(7, || Ok(report(3))).unwrap();
        assert!(!cached);
    }

    #[test]
    fn failed_requests_do_not_evict_stored_reports() {
        let cache = ReportCache::new(2);
        let (stored, _) = cache.get_or_compute(100, || Ok(report(5))).unwrap();

        for key in [1, 2] {
            let err = cache.get_or_compute(key, || Err(AnalysisError::EmptySeries));
            assert!(err.is_err());
        }
        assert_eq!(cache.len(), 1);

        let (again, cached) = cache
            .get_or_compute(100, || panic!("stored report was evicted"))
            .unwrap();
        assert!(cached);
        assert!(Arc::ptr_eq(&stored, &again));

        cache.get_or_compute(3, || Ok(report(4))).unwrap();
        assert_eq!(cache.len(), 2);
        let (_, cached) = cache.get_or_compute(100, || Ok(report(5))).unwrap();
        assert!(cached);
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = ReportCache::new(0);
        cache.get_or_compute(1, || Ok(report(3))).unwrap();
        let (_, cached) = cache.get_or_compute(1, || Ok(report(3))).unwrap();
        assert!(!cached);
        assert!(cache.is_empty());
    }

    #[test]
    fn fingerprint_tracks_every_input() {
        let samples: Vec<Sample> = (0..5).map(|i| Sample::new(i, 100.0 + i as f64)).collect();
        let market = MarketInputs::default();
        let params = AnalysisParams::default();
        let base = fingerprint(&samples, None, &market, &params);

        assert_eq!(base, fingerprint(&samples, None, &market, &params));

        let mut moved = samples.clone();
        moved[2].price += 0.01;
        assert_ne!(base, fingerprint(&moved, None, &market, &params));

        assert_ne!(base, fingerprint(&samples, Some(&[1.0; 5]), &market, &params));

        let tuned = AnalysisParams {
            rsi_period: 7,
            ..Default::default()
        };
        assert_ne!(base, fingerprint(&samples, None, &market, &tuned));

        let sentiment = MarketInputs {
            sentiment: Some(0.8),
            ..Default::default()
        };
        assert_ne!(base, fingerprint(&samples, None, &sentiment, &params));
    }
}
