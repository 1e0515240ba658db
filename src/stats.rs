//! Descriptive statistics shared by the analyzers.
//!
//! Every function is total: empty input yields `None` (or 0 for dispersion),
//! never NaN.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`). Zero for fewer than two values.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    // Guard tiny negative rounding residue before the square root.
    variance.max(0.0).sqrt()
}

/// Ascending copy of `values`, NaNs ordered last.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.total_cmp(b));
    out
}

/// Median of an ascending slice; mean of the two middle elements for even counts.
pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    median_sorted(&sorted(values))
}

/// Linear-interpolation percentile over an ascending slice.
///
/// `index = p/100 * (n-1)`, interpolated between the floor and ceil elements.
/// `p` is clamped to `[0, 100]`.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 100.0);
    let index = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = index - lower as f64;
    Some(sorted[lower] * (1.0 - weight) + sorted[upper] * weight)
}

/// `stddev / mean`, `None` when the mean is zero or the input is empty.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if avg == 0.0 {
        return None;
    }
    Some(population_stddev(values) / avg)
}

/// Round to two decimals. Applied only when results are assembled for output.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Basic summary used by the aggregators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
    pub stddev: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let avg = mean(&sorted)?;
        let median = median_sorted(&sorted)?;
        Some(Self {
            count: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            avg,
            median,
            stddev: population_stddev(&sorted),
        })
    }
}
