// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is then the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Close-only series have no measured range. In that case the caller passes
// synthetic highs/lows (see `TimeSeries::high_low`) and the reading carries a
// `RangeSource::SyntheticSpread` label.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::series::TimeSeries;
use crate::types::RangeSource;

/// Latest ATR together with the provenance of the high/low data behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrReading {
    pub value: f64,
    /// ATR as a percentage of the last close; absent when the close is zero.
    pub pct_of_price: Option<f64>,
    pub range_source: RangeSource,
}

/// Compute the most recent ATR from parallel high/low/close slices.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - The slices differ in length.
/// - There are fewer than `period + 1` bars (each TR needs a previous close).
/// - Any intermediate value is non-finite.
pub fn calculate_atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<f64> {
    let n = closes.len();
    if period == 0 || highs.len() != n || lows.len() != n || n < period + 1 {
        return None;
    }

    let tr_values: Vec<f64> = (1..n)
        .map(|i| {
            let prev_close = closes[i - 1];
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - prev_close).abs();
            let lc = (lows[i] - prev_close).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let seed: f64 = tr_values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return None;
    }

    let period_f = period as f64;
    let mut atr = seed;
    for &tr in &tr_values[period..] {
        atr = (atr * (period_f - 1.0) + tr) / period_f;
        if !atr.is_finite() {
            return None;
        }
    }

    Some(atr)
}

/// ATR over a [`TimeSeries`], synthesising high/low with `spread_pct` when
/// the series carries no measured range.
pub fn atr_for_series(series: &TimeSeries, period: usize, spread_pct: f64) -> Option<AtrReading> {
    let (highs, lows, range_source) = series.high_low(spread_pct);
    let value = calculate_atr(&highs, &lows, series.closes(), period)?;
    let last_close = series.last()?.price;
    let pct_of_price = (last_close != 0.0).then(|| value / last_close * 100.0);

    Some(AtrReading {
        value,
        pct_of_price,
        range_source,
    })
}
