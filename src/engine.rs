// =============================================================================
// Analysis Engine — single entry point composing every indicator
// =============================================================================
//
// `analyze` is a pure function of its inputs: the same series, volumes,
// market inputs and parameters always produce the same report. It reads no
// clock and holds no state between calls; `as_of` is taken from the data.
//
// Pipeline:
//   validate inputs and params
//   trend       SMA / EMA per configured period
//   momentum    RSI, stochastic %K/%D
//   volatility  Bollinger, ATR, percentage volatility
//   levels      support / resistance
//   pattern     impulse + phase heuristics
//   prediction  sub-scores -> composite score
//
// Indicators that lack data are reported as `None`. Only validation fails.
// =============================================================================

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::AnalysisError;
use crate::indicators::{
    atr_for_series, calculate_bollinger, latest_ema, latest_rsi, latest_sma, pct_volatility,
    stochastic_for_series, AtrReading, BollingerBands, StochasticReading,
};
use crate::levels::{ExtremaDetector, Level};
use crate::patterns::{analyze_patterns, PatternConfig, PatternReport};
use crate::scoring::{
    CompositeScorer, CompositeWeights, MarketInputs, PredictionReport, PriceTargets, SubScores,
    TechnicalSnapshot,
};
use crate::series::{TimeSeries, VolumeSeries};
use crate::types::Approximation;

// =============================================================================
// Parameters
// =============================================================================

fn default_sma_periods() -> Vec<usize> {
    vec![20, 50]
}

fn default_ema_periods() -> Vec<usize> {
    vec![12, 26]
}

fn default_rsi_period() -> usize {
    14
}

fn default_bb_period() -> usize {
    20
}

fn default_bb_k() -> f64 {
    2.0
}

fn default_atr_period() -> usize {
    14
}

fn default_atr_spread_pct() -> f64 {
    2.0
}

fn default_sr_lookback() -> usize {
    10
}

fn default_max_levels() -> usize {
    10
}

fn default_touch_tolerance_pct() -> f64 {
    0.5
}

fn default_k_period() -> usize {
    14
}

fn default_d_period() -> usize {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StochasticParams {
    #[serde(default = "default_k_period")]
    pub k: usize,
    #[serde(default = "default_d_period")]
    pub d: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k: default_k_period(),
            d: default_d_period(),
        }
    }
}

/// Every tunable of an analysis. Partial JSON fills the rest with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    #[serde(default = "default_sma_periods")]
    pub sma_periods: Vec<usize>,

    #[serde(default = "default_ema_periods")]
    pub ema_periods: Vec<usize>,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default)]
    pub stochastic: StochasticParams,

    #[serde(default = "default_bb_period")]
    pub bb_period: usize,

    /// Band width in standard deviations.
    #[serde(default = "default_bb_k")]
    pub bb_k: f64,

    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Spread (percent of close) used to synthesise high/low when the series
    /// has no measured range.
    #[serde(default = "default_atr_spread_pct")]
    pub atr_spread_pct: f64,

    /// Trailing window for percentage volatility; whole series when absent.
    #[serde(default)]
    pub volatility_window: Option<usize>,

    /// Pivot radius for support/resistance.
    #[serde(default = "default_sr_lookback")]
    pub sr_lookback: usize,

    #[serde(default = "default_max_levels")]
    pub max_levels: usize,

    #[serde(default = "default_touch_tolerance_pct")]
    pub touch_tolerance_pct: f64,

    #[serde(default)]
    pub pattern: PatternConfig,

    #[serde(default)]
    pub weights: CompositeWeights,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            sma_periods: default_sma_periods(),
            ema_periods: default_ema_periods(),
            rsi_period: default_rsi_period(),
            stochastic: StochasticParams::default(),
            bb_period: default_bb_period(),
            bb_k: default_bb_k(),
            atr_period: default_atr_period(),
            atr_spread_pct: default_atr_spread_pct(),
            volatility_window: None,
            sr_lookback: default_sr_lookback(),
            max_levels: default_max_levels(),
            touch_tolerance_pct: default_touch_tolerance_pct(),
            pattern: PatternConfig::default(),
            weights: CompositeWeights::default(),
        }
    }
}

fn positive(name: &'static str, value: usize) -> Result<(), AnalysisError> {
    if value == 0 {
        return Err(AnalysisError::param(name, "must be > 0"));
    }
    Ok(())
}

fn finite_at_least(name: &'static str, value: f64, min: f64) -> Result<(), AnalysisError> {
    if !value.is_finite() || value < min {
        return Err(AnalysisError::param(name, format!("must be finite and >= {min}, got {value}")));
    }
    Ok(())
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for &period in &self.sma_periods {
            positive("sma_periods", period)?;
        }
        for &period in &self.ema_periods {
            positive("ema_periods", period)?;
        }
        positive("rsi_period", self.rsi_period)?;
        positive("stochastic.k", self.stochastic.k)?;
        positive("stochastic.d", self.stochastic.d)?;
        positive("bb_period", self.bb_period)?;
        if !self.bb_k.is_finite() || self.bb_k <= 0.0 {
            return Err(AnalysisError::param(
                "bb_k",
                format!("must be finite and > 0, got {}", self.bb_k),
            ));
        }
        positive("atr_period", self.atr_period)?;
        finite_at_least("atr_spread_pct", self.atr_spread_pct, 0.0)?;
        if self.atr_spread_pct >= 100.0 {
            return Err(AnalysisError::param("atr_spread_pct", "must be < 100"));
        }
        if let Some(window) = self.volatility_window {
            if window < 2 {
                return Err(AnalysisError::param("volatility_window", "must be >= 2"));
            }
        }
        positive("sr_lookback", self.sr_lookback)?;
        positive("max_levels", self.max_levels)?;
        finite_at_least("touch_tolerance_pct", self.touch_tolerance_pct, 0.0)?;

        let pattern = &self.pattern;
        if pattern.window < 2 {
            return Err(AnalysisError::param("pattern.window", "must be >= 2"));
        }
        finite_at_least("pattern.impulse_ratio", pattern.impulse_ratio, 1.0)?;
        finite_at_least("pattern.consolidating_range_pct", pattern.consolidating_range_pct, 0.0)?;
        if !pattern.trending_range_pct.is_finite()
            || pattern.trending_range_pct <= pattern.consolidating_range_pct
        {
            return Err(AnalysisError::param(
                "pattern.trending_range_pct",
                "must be finite and above consolidating_range_pct",
            ));
        }

        self.weights.validate()
    }
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSection {
    /// Latest SMA keyed by period; `None` when the series is too short.
    pub sma: BTreeMap<usize, Option<f64>>,
    pub ema: BTreeMap<usize, Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumSection {
    pub rsi: Option<f64>,
    pub stochastic: Option<StochasticReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySection {
    pub bollinger: Option<BollingerBands>,
    pub atr: Option<AtrReading>,
    pub pct_volatility: Option<f64>,
}

/// Everything one `analyze` call derives from a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sample_count: usize,
    /// Timestamp of the last sample (millis).
    pub as_of: i64,
    pub last_price: f64,
    pub trend: TrendSection,
    pub momentum: MomentumSection,
    pub volatility: VolatilitySection,
    pub levels: Vec<Level>,
    pub pattern: PatternReport,
    pub prediction: PredictionReport,
    pub approximations: Vec<Approximation>,
}

// =============================================================================
// analyze
// =============================================================================

pub fn analyze(
    series: &TimeSeries,
    volumes: Option<&VolumeSeries>,
    market: &MarketInputs,
    params: &AnalysisParams,
) -> Result<AnalysisReport, AnalysisError> {
    params.validate()?;
    market.validate()?;
    let last = series.last().ok_or(AnalysisError::EmptySeries)?;
    if let Some(volumes) = volumes {
        volumes.ensure_aligned(series)?;
    }
    let closes = series.closes();

    // ── Trend ──────────────────────────────────────────────────────────
    let sma: BTreeMap<usize, Option<f64>> =
        params.sma_periods.iter().map(|&p| (p, latest_sma(closes, p))).collect();
    let ema: BTreeMap<usize, Option<f64>> =
        params.ema_periods.iter().map(|&p| (p, latest_ema(closes, p))).collect();

    // ── Momentum ───────────────────────────────────────────────────────
    let rsi = latest_rsi(closes, params.rsi_period);
    let stochastic = stochastic_for_series(
        series,
        params.stochastic.k,
        params.stochastic.d,
        params.atr_spread_pct,
    );

    // ── Volatility ─────────────────────────────────────────────────────
    let bollinger = calculate_bollinger(closes, params.bb_period, params.bb_k);
    let atr = atr_for_series(series, params.atr_period, params.atr_spread_pct);
    let pct_vol = pct_volatility(closes, params.volatility_window);

    if rsi.is_none() || bollinger.is_none() || atr.is_none() {
        trace!(
            samples = series.len(),
            rsi = rsi.is_some(),
            bollinger = bollinger.is_some(),
            atr = atr.is_some(),
            "some indicators lack data"
        );
    }

    // ── Levels & patterns ──────────────────────────────────────────────
    let levels = ExtremaDetector::new(
        params.sr_lookback,
        params.max_levels,
        params.touch_tolerance_pct,
    )
    .detect(series, volumes);
    let pattern = analyze_patterns(closes, &params.pattern);

    // ── Prediction ─────────────────────────────────────────────────────
    let snapshot = TechnicalSnapshot {
        rsi,
        trend_label: pattern.trend_label,
        last_price: last.price,
        fast_ema: fastest(&ema),
        fast_sma: fastest(&sma),
        slow_sma: slowest(&sma),
    };
    let sub_scores = SubScores::derive(&snapshot, volumes.and_then(VolumeSeries::last), market);
    let targets = PriceTargets {
        support: bollinger.map(|b| b.lower),
        resistance: bollinger.map(|b| b.upper),
    };
    let prediction = CompositeScorer::new(params.weights.clone())?.score(&sub_scores, targets)?;

    // ── Approximation flags ────────────────────────────────────────────
    let mut approximations = Vec::new();
    let synthetic = atr.is_some_and(|a| a.range_source.is_synthetic())
        || stochastic.is_some_and(|s| s.range_source.is_synthetic());
    if synthetic {
        approximations.push(Approximation::SyntheticHighLow);
    }
    if volumes.is_none() {
        approximations.push(Approximation::VolumeUnavailable);
    }

    debug!(
        samples = series.len(),
        as_of = last.timestamp,
        levels = levels.len(),
        trend = %pattern.trend_label,
        phase = %pattern.phase_label,
        direction = %prediction.direction,
        score = prediction.score,
        "analysis complete"
    );

    Ok(AnalysisReport {
        sample_count: series.len(),
        as_of: last.timestamp,
        last_price: last.price,
        trend: TrendSection { sma, ema },
        momentum: MomentumSection { rsi, stochastic },
        volatility: VolatilitySection {
            bollinger,
            atr,
            pct_volatility: pct_vol,
        },
        levels,
        pattern,
        prediction,
        approximations,
    })
}

/// Value of the shortest period, when it has one.
fn fastest(values: &BTreeMap<usize, Option<f64>>) -> Option<f64> {
    values.values().next().copied().flatten()
}

/// Value of the longest period. `None` with fewer than two distinct periods.
fn slowest(values: &BTreeMap<usize, Option<f64>>) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    values.values().next_back().copied().flatten()
}
