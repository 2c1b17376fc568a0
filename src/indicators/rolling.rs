// =============================================================================
// Rolling Statistics — O(n) sliding-window primitives
// =============================================================================
//
// Every windowed indicator sits on top of these helpers. Each window position
// is derived from the previous one by adding the entering element and
// removing the leaving one, so a full pass costs O(n) regardless of `window`.
//
// Variance uses the sliding form of Welford's update:
//
//   sum'  = sum + x_in - x_out
//   m2'   = m2 + (x_in - x_out) * (x_in - mean' + x_out - mean)
//
// The running sum carries a Neumaier compensation term, and the whole state
// is rebuilt from the window itself every `window` steps, so rounding error
// cannot build up over long series. Once a constant stretch spans a rebuild,
// its windows read exactly that value as the mean with zero variance.
//
// Rolling min / max use a monotonic deque of indices. Equal values already in
// the deque are kept, so the front is always the *first* index holding the
// extreme within the window.
// =============================================================================

use std::collections::VecDeque;

/// Sum, mean and population variance of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub sum: f64,
    pub mean: f64,
    pub variance: f64,
}

impl WindowStats {
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }
}

/// Window statistics for every valid window end.
///
/// Returns `values.len() - window + 1` entries, or an empty vec when
/// `window == 0` or `window > values.len()`.
pub fn rolling_stats(values: &[f64], window: usize) -> Vec<WindowStats> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }

    let w = window as f64;
    let mut acc = WindowAccumulator::exact(&values[..window]);
    let mut out = Vec::with_capacity(values.len() - window + 1);
    out.push(acc.stats(w));

    for i in window..values.len() {
        if (i + 1) % window == 0 {
            acc = WindowAccumulator::exact(&values[i + 1 - window..=i]);
        } else {
            acc.slide(values[i], values[i - window], w);
        }
        out.push(acc.stats(w));
    }

    out
}

/// Running state of one window: compensated sum, mean and Welford's m2.
struct WindowAccumulator {
    sum: f64,
    compensation: f64,
    mean: f64,
    m2: f64,
}

impl WindowAccumulator {
    /// Fresh state from the window contents. The mean is taken relative to
    /// the first element, so equal values give that value back exactly.
    fn exact(window: &[f64]) -> Self {
        let w = window.len() as f64;
        let pivot = window.first().copied().unwrap_or(0.0);
        let mut acc = Self {
            sum: 0.0,
            compensation: 0.0,
            mean: 0.0,
            m2: 0.0,
        };
        for &x in window {
            acc.add(x);
        }
        acc.mean = pivot + window.iter().map(|x| x - pivot).sum::<f64>() / w;
        acc.m2 = window.iter().map(|x| (x - acc.mean).powi(2)).sum();
        acc
    }

    fn slide(&mut self, x_in: f64, x_out: f64, w: f64) {
        let prev_mean = self.mean;
        self.add(x_in);
        self.add(-x_out);
        self.mean = prev_mean + (x_in - x_out) / w;
        self.m2 += (x_in - x_out) * (x_in - self.mean + x_out - prev_mean);
    }

    // Neumaier: keep the low-order bits lost by each addition.
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }

    fn stats(&self, w: f64) -> WindowStats {
        WindowStats {
            sum: self.total(),
            mean: self.mean,
            variance: (self.m2 / w).max(0.0),
        }
    }
}

/// Trailing window sums.
pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    rolling_stats(values, window).iter().map(|s| s.sum).collect()
}

/// Trailing window means.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling_stats(values, window).iter().map(|s| s.mean).collect()
}

/// `(index, value)` of the first-encountered minimum of every trailing window.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<(usize, f64)> {
    rolling_extreme(values, window, |incoming, held| incoming < held)
}

/// `(index, value)` of the first-encountered maximum of every trailing window.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<(usize, f64)> {
    rolling_extreme(values, window, |incoming, held| incoming > held)
}

fn rolling_extreme(
    values: &[f64],
    window: usize,
    beats: impl Fn(f64, f64) -> bool,
) -> Vec<(usize, f64)> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut out = Vec::with_capacity(values.len() - window + 1);

    for (i, &v) in values.iter().enumerate() {
        // Strict comparison: an equal earlier value stays ahead of `i`.
        while let Some(&back) = deque.back() {
            if beats(v, values[back]) {
                deque.pop_back();
            } else {
                break;
            }
        }
        deque.push_back(i);

        while let Some(&front) = deque.front() {
            if front + window <= i {
                deque.pop_front();
            } else {
                break;
            }
        }

        if i + 1 >= window {
            if let Some(&front) = deque.front() {
                out.push((front, values[front]));
            }
        }
    }

    out
}
