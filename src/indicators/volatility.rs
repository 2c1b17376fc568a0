// =============================================================================
// Percentage Volatility
// =============================================================================
//
// Population standard deviation of simple period-over-period returns,
// expressed in percent:
//
//   r_t = (close_t - close_{t-1}) / close_{t-1}
//   vol = stddev(r) * 100
//
// Computed over the whole series unless a trailing window is requested.
// Returns whose previous close is zero are undefined and skipped.

/// Simple returns between consecutive closes, skipping zero-based ones.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Percentage volatility of `closes`.
///
/// `window`, when given, restricts the computation to the trailing `window`
/// closes. Returns `None` when fewer than two closes are available or no
/// return is defined.
pub fn pct_volatility(closes: &[f64], window: Option<usize>) -> Option<f64> {
    let slice = match window {
        Some(w) if w < closes.len() => &closes[closes.len() - w..],
        _ => closes,
    };
    if slice.len() < 2 {
        return None;
    }

    let returns = simple_returns(slice);
    if returns.is_empty() {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let vol = variance.sqrt() * 100.0;

    vol.is_finite().then_some(vol)
}
