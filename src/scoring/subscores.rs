// =============================================================================
// Sub-score derivation
// =============================================================================
//
// Every sub-score lives in [0, 1] with 0.5 meaning "no lean".
//
// technical   = 0.7 * trend + 0.3 * momentum
//   momentum  : RSI < 30 => 0.7 (oversold, bullish lean)
//               RSI > 70 => 0.3 (overbought, bearish lean)
//               else / absent => 0.5
//   trend     : mean of the available votes (1 bullish, 0 bearish, 0.5 flat)
//               - impulse label
//               - last close vs fastest EMA
//               - fastest SMA vs slowest SMA
//               no votes => 0.5
//
// fundamental : liquidity ratio = latest volume / market cap, mapped linearly
//               from [1%, 10%] onto [0.3, 0.7]; missing inputs => 0.5
//
// sentiment / structure are supplied by the caller (default 0.5).

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::indicators::rsi::RsiZone;
use crate::patterns::TrendLabel;

pub const NEUTRAL: f64 = 0.5;

const TREND_SHARE: f64 = 0.7;
const MOMENTUM_SHARE: f64 = 0.3;
const OVERSOLD_LEAN: f64 = 0.7;
const OVERBOUGHT_LEAN: f64 = 0.3;

const LIQUIDITY_LOW: f64 = 0.01;
const LIQUIDITY_HIGH: f64 = 0.10;

/// Externally sourced inputs (sentiment feeds, market-structure data).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    /// Sentiment sub-score in [0, 1].
    #[serde(default)]
    pub sentiment: Option<f64>,
    /// Institutional-interest sub-score in [0, 1].
    #[serde(default)]
    pub institutional_interest: Option<f64>,
    /// Market capitalisation in quote currency, used for the liquidity ratio.
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl MarketInputs {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        check_unit("sentiment", self.sentiment)?;
        check_unit("institutional_interest", self.institutional_interest)?;
        if let Some(cap) = self.market_cap {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(AnalysisError::param(
                    "market_cap",
                    format!("must be finite and > 0, got {cap}"),
                ));
            }
        }
        Ok(())
    }
}

fn check_unit(name: &'static str, value: Option<f64>) -> Result<(), AnalysisError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => {
            Err(AnalysisError::SubScoreOutOfRange { name, value: v })
        }
        _ => Ok(()),
    }
}

/// Indicator values the technical sub-score reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalSnapshot {
    pub rsi: Option<f64>,
    pub trend_label: TrendLabel,
    pub last_price: f64,
    pub fast_ema: Option<f64>,
    pub fast_sma: Option<f64>,
    pub slow_sma: Option<f64>,
}

/// The four sub-scores fed to the composite scorer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub technical: f64,
    pub fundamental: f64,
    pub sentiment: f64,
    pub structure: f64,
}

impl SubScores {
    pub fn derive(
        snapshot: &TechnicalSnapshot,
        latest_volume: Option<f64>,
        market: &MarketInputs,
    ) -> Self {
        Self {
            technical: technical_score(snapshot),
            fundamental: fundamental_score(latest_volume, market.market_cap),
            sentiment: market.sentiment.unwrap_or(NEUTRAL),
            structure: market.institutional_interest.unwrap_or(NEUTRAL),
        }
    }
}

pub fn momentum_component(rsi: Option<f64>) -> f64 {
    match rsi.map(RsiZone::of) {
        Some(RsiZone::Oversold) => OVERSOLD_LEAN,
        Some(RsiZone::Overbought) => OVERBOUGHT_LEAN,
        Some(RsiZone::Neutral) | None => NEUTRAL,
    }
}

pub fn trend_component(snapshot: &TechnicalSnapshot) -> f64 {
    let impulse_vote = match snapshot.trend_label {
        TrendLabel::BullishImpulse => Some(1.0),
        TrendLabel::BearishImpulse => Some(0.0),
        TrendLabel::Unknown => None,
    };
    let ema_vote = snapshot.fast_ema.map(|ema| vote(snapshot.last_price, ema));
    let sma_vote = match (snapshot.fast_sma, snapshot.slow_sma) {
        (Some(fast), Some(slow)) => Some(vote(fast, slow)),
        _ => None,
    };

    let votes: Vec<f64> = [impulse_vote, ema_vote, sma_vote].into_iter().flatten().collect();
    if votes.is_empty() {
        NEUTRAL
    } else {
        votes.iter().sum::<f64>() / votes.len() as f64
    }
}

pub fn technical_score(snapshot: &TechnicalSnapshot) -> f64 {
    let score = TREND_SHARE * trend_component(snapshot)
        + MOMENTUM_SHARE * momentum_component(snapshot.rsi);
    score.clamp(0.0, 1.0)
}

pub fn fundamental_score(latest_volume: Option<f64>, market_cap: Option<f64>) -> f64 {
    match (latest_volume, market_cap) {
        (Some(volume), Some(cap)) if cap > 0.0 => {
            remap(volume / cap, LIQUIDITY_LOW, LIQUIDITY_HIGH, 0.3, 0.7)
        }
        _ => NEUTRAL,
    }
}

fn vote(a: f64, b: f64) -> f64 {
    if a > b {
        1.0
    } else if a < b {
        0.0
    } else {
        NEUTRAL
    }
}

/// Linearly remap `value` from `[in_lo, in_hi]` to `[out_lo, out_hi]`, clamped
/// to the output range. Works regardless of whether `in_lo < in_hi` or vice
/// versa.
pub(crate) fn remap(value: f64, in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    let t = if (in_hi - in_lo).abs() < f64::EPSILON {
        0.5
    } else {
        (value - in_lo) / (in_hi - in_lo)
    };
    let clamped = t.clamp(0.0, 1.0);
    out_lo + clamped * (out_hi - out_lo)
}
