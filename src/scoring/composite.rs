// =============================================================================
// Composite Scorer — weighted sub-score aggregation
// =============================================================================
//
//   score = Σ weight_i * sub_score_i          (weights sum to 1)
//
//   score > 0.6 => BULLISH,  score < 0.4 => BEARISH,  else NEUTRAL
//   confidence  = |score - 0.5| * 200         clamped to [0, 100]
//   risk        = HIGH   if score > 0.7 or < 0.3
//                 MEDIUM if score > 0.6 or < 0.4
//                 LOW    otherwise

use serde::{Deserialize, Serialize};

use super::subscores::SubScores;
use crate::error::AnalysisError;
use crate::types::{Direction, RiskLevel};

const BULLISH_ABOVE: f64 = 0.6;
const BEARISH_BELOW: f64 = 0.4;
const HIGH_RISK_ABOVE: f64 = 0.7;
const HIGH_RISK_BELOW: f64 = 0.3;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

fn default_technical() -> f64 {
    0.4
}

fn default_fundamental() -> f64 {
    0.3
}

fn default_sentiment() -> f64 {
    0.2
}

fn default_structure() -> f64 {
    0.1
}

/// Sub-score weights. Must be finite, non-negative and sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    #[serde(default = "default_technical")]
    pub technical: f64,
    #[serde(default = "default_fundamental")]
    pub fundamental: f64,
    #[serde(default = "default_sentiment")]
    pub sentiment: f64,
    #[serde(default = "default_structure")]
    pub structure: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            technical: default_technical(),
            fundamental: default_fundamental(),
            sentiment: default_sentiment(),
            structure: default_structure(),
        }
    }
}

impl CompositeWeights {
    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("technical", self.technical),
            ("fundamental", self.fundamental),
            ("sentiment", self.sentiment),
            ("structure", self.structure),
        ]
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, weight) in self.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AnalysisError::param(
                    name,
                    format!("weight must be finite and >= 0, got {weight}"),
                ));
            }
        }
        let sum: f64 = self.entries().iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AnalysisError::WeightsDoNotSumToOne { sum });
        }
        Ok(())
    }
}

/// One sub-score's share of the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScoreContribution {
    pub name: String,
    pub weight: f64,
    pub sub_score: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTargets {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub direction: Direction,
    pub score: f64,
    /// In [0, 100].
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub price_targets: PriceTargets,
    pub contributions: Vec<SubScoreContribution>,
}

pub struct CompositeScorer {
    weights: CompositeWeights,
}

impl CompositeScorer {
    /// Fails when the weights are invalid.
    pub fn new(weights: CompositeWeights) -> Result<Self, AnalysisError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &CompositeWeights {
        &self.weights
    }

    pub fn score(
        &self,
        sub_scores: &SubScores,
        targets: PriceTargets,
    ) -> Result<PredictionReport, AnalysisError> {
        let values = [
            sub_scores.technical,
            sub_scores.fundamental,
            sub_scores.sentiment,
            sub_scores.structure,
        ];

        let mut contributions = Vec::with_capacity(values.len());
        let mut total = 0.0;

        for ((name, weight), sub_score) in self.weights.entries().into_iter().zip(values) {
            if !(0.0..=1.0).contains(&sub_score) {
                return Err(AnalysisError::SubScoreOutOfRange { name, value: sub_score });
            }
            let contribution = weight * sub_score;
            contributions.push(SubScoreContribution {
                name: name.to_string(),
                weight,
                sub_score,
                contribution,
            });
            total += contribution;
        }

        let score = total.clamp(0.0, 1.0);

        Ok(PredictionReport {
            direction: direction_for(score),
            score,
            confidence: confidence_for(score),
            risk_level: risk_for(score),
            price_targets: targets,
            contributions,
        })
    }
}

pub fn direction_for(score: f64) -> Direction {
    if score > BULLISH_ABOVE {
        Direction::Bullish
    } else if score < BEARISH_BELOW {
        Direction::Bearish
    } else {
        Direction::Neutral
    }
}

pub fn confidence_for(score: f64) -> f64 {
    ((score - 0.5).abs() * 200.0).clamp(0.0, 100.0)
}

pub fn risk_for(score: f64) -> RiskLevel {
    if score > HIGH_RISK_ABOVE || score < HIGH_RISK_BELOW {
        RiskLevel::High
    } else if score > BULLISH_ABOVE || score < BEARISH_BELOW {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
