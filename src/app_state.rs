// =============================================================================
// Central Application State
// =============================================================================
//
// Shared across handlers via `Arc<AppState>`. The config is read-only after
// startup; the cache and counters manage their own interior mutability.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::ReportCache;
use crate::config::ServiceConfig;

pub struct AppState {
    pub config: ServiceConfig,
    pub cache: ReportCache,

    /// Successful analyses returned to clients, cached or not.
    analyses_served: AtomicU64,

    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        let cache = ReportCache::new(config.cache_capacity);
        Self {
            config,
            cache,
            analyses_served: AtomicU64::new(0),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn record_served(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::SeqCst)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_follows_configured_capacity() {
        let state = AppState::new(ServiceConfig {
            cache_capacity: 3,
            ..Default::default()
        });
        assert_eq!(state.cache.capacity(), 3);
        assert_eq!(state.analyses_served(), 0);
        assert_eq!(state.record_served(), 1);
        assert_eq!(state.analyses_served(), 1);
    }
}
