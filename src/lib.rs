// =============================================================================
// Aurora Analysis — Technical Indicator & Composite Scoring Engine
// =============================================================================
//
// Core: a deterministic transformation from a price (and optional volume)
// series into indicators, support/resistance levels, heuristic pattern labels
// and a composite directional forecast. See `engine::analyze`.
//
// Shell: an axum JSON service that runs the core on posted series.
// =============================================================================

// ── Core ─────────────────────────────────────────────────────────────────────
pub mod engine;
pub mod error;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod scoring;
pub mod series;
pub mod types;

// ── Service shell ────────────────────────────────────────────────────────────
pub mod api;
pub mod app_state;
pub mod cache;
pub mod config;
pub mod envelope;

pub use engine::{analyze, AnalysisParams, AnalysisReport};
pub use error::AnalysisError;
pub use scoring::MarketInputs;
pub use series::{Sample, TimeSeries, VolumeSeries};
