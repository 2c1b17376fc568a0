// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the analysis engine. Series functions return an empty `Vec` and latest-value
// functions return `None` when the input is too short, so callers are forced
// to handle insufficient data explicitly.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volatility;

pub use atr::{atr_for_series, calculate_atr, AtrReading};
pub use bollinger::{calculate_bollinger, calculate_bollinger_series, BollingerBands};
pub use ema::{calculate_ema, latest_ema};
pub use rolling::{rolling_max, rolling_mean, rolling_min, rolling_stats, rolling_sum, WindowStats};
pub use rsi::{calculate_rsi, latest_rsi, RsiZone};
pub use sma::{calculate_sma, latest_sma};
pub use stochastic::{calculate_percent_k, stochastic_for_series, StochasticReading};
pub use volatility::pct_volatility;
