// =============================================================================
// Composite Scoring Module
// =============================================================================

pub mod composite;
pub mod subscores;

pub use composite::{
    CompositeScorer, CompositeWeights, PredictionReport, PriceTargets, SubScoreContribution,
};
pub use subscores::{MarketInputs, SubScores, TechnicalSnapshot};
