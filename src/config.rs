// =============================================================================
// Service Configuration — JSON file with environment overrides
// =============================================================================
//
// Every field carries a serde default so a partial (or empty) file still
// loads. Environment overrides are applied after the file:
//
//   AURORA_BIND_ADDR       listen address
//   AURORA_CACHE_CAPACITY  report cache size (0 disables the cache)
//
// The `analysis` block holds the defaults used when a request omits `params`.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::AnalysisParams;

pub const DEFAULT_CONFIG_PATH: &str = "analysis_config.json";

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_cache_capacity() -> usize {
    256
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    #[serde(default)]
    pub analysis: AnalysisParams,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cache_capacity: default_cache_capacity(),
            analysis: AnalysisParams::default(),
        }
    }
}

impl ServiceConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read service config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse service config from {}", path.display()))?;

        config
            .analysis
            .validate()
            .with_context(|| format!("invalid analysis defaults in {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            cache_capacity = config.cache_capacity,
            "service config loaded"
        );

        Ok(config)
    }

    /// Apply `AURORA_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("AURORA_BIND_ADDR") {
            let addr = addr.trim();
            if !addr.is_empty() {
                self.bind_addr = addr.to_string();
            }
        }

        if let Some(raw) = lookup("AURORA_CACHE_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(capacity) => self.cache_capacity = capacity,
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid AURORA_CACHE_CAPACITY"),
            }
        }
    }
}
