//! Summary statistics over series that may carry NaN warmup values.
//!
//! NaN entries are skipped, so a mean over an indicator series only
//! considers the bars where that indicator is defined.

/// Arithmetic mean of the non-NaN values. NaN if there are none.
pub fn mean_defined(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sample standard deviation (ddof = 1) of the non-NaN values.
/// NaN if fewer than two values are defined.
pub fn sample_std_defined(values: &[f64]) -> f64 {
    let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sample_std(&defined)
}

/// Sample standard deviation (ddof = 1). NaN for fewer than two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Last value of a series (NaN for an empty series).
pub fn last(values: &[f64]) -> f64 {
    values.last().copied().unwrap_or(f64::NAN)
}
