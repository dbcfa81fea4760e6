//! Summary statistics over pooled observations.
//!
//! Empty inputs yield zero rather than NaN so downstream metrics stay
//! printable for replications that observed nothing.

use crate::rng::Pcg32;
use crate::state::ConfidenceInterval;

pub const BOOTSTRAP_RESAMPLES: usize = 1_000;
pub const CONFIDENCE_LEVEL: f64 = 0.95;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn sort(values: &mut [f64]) {
    values.sort_unstable_by(f64::total_cmp);
}

/// Linear interpolation between order statistics at `(p / 100) * (n - 1)`.
/// `sorted` must be ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let (lower, upper, fraction) = rank(sorted.len(), p);
    if lower == upper {
        return sorted[lower];
    }
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Same as [`percentile`] without a full sort; reorders `values`.
pub fn percentile_unsorted(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let (lower, upper, fraction) = rank(values.len(), p);
    let (_, low_value, above) = values.select_nth_unstable_by(lower, f64::total_cmp);
    let low_value = *low_value;
    if lower == upper {
        return low_value;
    }
    let high_value = above
        .iter()
        .copied()
        .min_by(f64::total_cmp)
        .unwrap_or(low_value);
    low_value + (high_value - low_value) * fraction
}

fn rank(len: usize, p: f64) -> (usize, usize, f64) {
    let index = (p / 100.0) * (len - 1) as f64;
    let lower = index.floor() as usize;
    let upper = (index.ceil() as usize).min(len - 1);
    (lower, upper, index - lower as f64)
}

/// Percentile bootstrap: resample `data` with replacement `resamples` times,
/// evaluate `statistic` on each draw and read the interval off the sorted
/// statistics. Draws come from `rng` in order, so the caller controls
/// reproducibility.
pub fn bootstrap_ci<F>(
    data: &[f64],
    mut statistic: F,
    rng: &mut Pcg32,
    resamples: usize,
    confidence: f64,
) -> ConfidenceInterval
where
    F: FnMut(&mut [f64]) -> f64,
{
    if data.is_empty() || resamples == 0 {
        return ConfidenceInterval::default();
    }

    let n = data.len();
    let mut sample = vec![0.0; n];
    let mut stats = Vec::with_capacity(resamples);
    for _ in 0..resamples {
        for slot in sample.iter_mut() {
            let idx = ((rng.uniform01() * n as f64) as usize).min(n - 1);
            *slot = data[idx];
        }
        stats.push(statistic(&mut sample));
    }
    sort(&mut stats);

    let tail = ((1.0 - confidence) / 2.0 * resamples as f64).floor() as usize;
    let lower_idx = tail.min(resamples - 1);
    let upper_idx = (resamples - tail).min(resamples - 1);
    ConfidenceInterval(stats[lower_idx], stats[upper_idx])
}
