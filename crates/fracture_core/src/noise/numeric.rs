//! Numeric value perturbation driven by per-column statistics.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::NumericMethod;

/// Mean and population standard deviation of a column's parseable values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl ColumnStats {
    /// Compute stats over the parseable values of a column. Returns `None`
    /// when no value parses as a number.
    pub fn compute(values: &[String]) -> Option<ColumnStats> {
        let parsed: Vec<f64> = values
            .iter()
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect();
        if parsed.is_empty() {
            return None;
        }

        let n = parsed.len() as f64;
        let mean = parsed.iter().sum::<f64>() / n;
        let variance = parsed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(ColumnStats {
            mean,
            std_dev: variance.sqrt(),
        })
    }
}

/// Produce a replacement for a numeric literal.
///
/// `ChangeValue` draws from a Gaussian with the column's mean and standard
/// deviation; `ChangeToOutlier` lands 3 to 5 standard deviations above the
/// mean. Up to 5 draws are attempted to avoid reproducing the original
/// literal, after which `"0"` is emitted. Returns `None` when the original
/// does not parse, leaving the cell for the caller to keep.
pub fn replace_numeric<R: Rng>(
    original: &str,
    stats: ColumnStats,
    method: NumericMethod,
    rng: &mut R,
) -> Option<String> {
    let trimmed = original.trim();
    trimmed.parse::<f64>().ok()?;
    let decimal = trimmed.contains('.');

    let normal = Normal::new(stats.mean, stats.std_dev).ok()?;
    for _ in 0..5 {
        let drawn = match method {
            NumericMethod::ChangeValue => normal.sample(rng),
            NumericMethod::ChangeToOutlier => {
                stats.mean + rng.random_range(3.0..5.0) * stats.std_dev
            }
        };
        let formatted = format_like(drawn, decimal);
        if formatted != trimmed {
            return Some(formatted);
        }
    }
    Some("0".to_string())
}

/// Format `value` the way the original literal was written: two decimals if
/// it contained a decimal point, a plain integer otherwise.
fn format_like(value: f64, decimal: bool) -> String {
    if decimal {
        format!("{value:.2}")
    } else {
        format!("{}", value.round() as i64)
    }
}
