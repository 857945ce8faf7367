//! Per-field summary statistics.

use serde::{Deserialize, Serialize};

/// Summary of one field's samples for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub count: usize,
}

/// Reduce samples to min/max/mean/population std-dev.
///
/// Non-finite samples are ignored. Returns `None` when nothing is left, so
/// callers drop the field instead of emitting NaN.
pub fn summarize(samples: &[f64]) -> Option<FieldStats> {
    let values: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    let count = values.len();
    if count == 0 {
        return None;
    }

    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    // Constant sets are exact: rounding in the sum must not leak a tiny
    // spread or move the mean off the sample value.
    if min == max {
        return Some(FieldStats {
            min,
            max,
            mean: min,
            std_dev: 0.0,
            count,
        });
    }

    let n = count as f64;
    let mean = (values.iter().sum::<f64>() / n).clamp(min, max);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(FieldStats {
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_two_three() {
        let s = summarize(&[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 3.0);
        assert_eq!(s.mean, 2.0);
        assert!((s.std_dev - 0.816_496_580_927_726).abs() < 1e-12);
        assert_eq!(s.count, 3);
    }

    #[test]
    fn constant_samples_have_zero_spread() {
        let s = summarize(&[0.1; 7]).unwrap();
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.min, s.max);
        assert_eq!(s.mean, s.min);
    }

    #[test]
    fn single_sample() {
        let s = summarize(&[4.2]).unwrap();
        assert_eq!(s.std_dev, 0.0);
        assert_eq!(s.mean, 4.2);
        assert_eq!(s.count, 1);
    }

    #[test]
    fn empty_is_none() {
        assert!(summarize(&[]).is_none());
        assert!(summarize(&[f64::NAN, f64::INFINITY]).is_none());
    }

    #[test]
    fn non_finite_samples_are_dropped() {
        let s = summarize(&[1.0, f64::NAN, 3.0]).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.std_dev, 1.0);
    }
}
