//! Chart rendering: the fixed sequence of analysis figures, each written as a
//! PNG under the output directory. Every render function owns its drawing
//! area for the duration of one chart and presents it before returning, so at
//! most one rendering context is alive at a time.

pub mod bivariate;
pub mod correlation;
pub mod univariate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::data::model::{DataFrame, Value};
use crate::error::EdaError;
use crate::stats;

/// Numeric columns analysed univariately, in order.
pub const NUMERIC_COLS: [&str; 2] = ["Age", "Fare"];

/// Categorical columns analysed univariately, in order.
pub const CATEGORICAL_COLS: [&str; 4] = ["Sex", "Pclass", "Embarked", "Survived"];

/// Standard figure size in pixels (10x6 inches at 100 dpi).
pub const FIGURE_SIZE: (u32, u32) = (1000, 600);

/// The scatter-plot matrix is square.
pub const MATRIX_SIZE: (u32, u32) = (1000, 1000);

// ---------------------------------------------------------------------------
// Chart artifacts
// ---------------------------------------------------------------------------

/// One rendered figure: its display title and the PNG it was written to.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub file: PathBuf,
}

/// Render the complete fixed chart sequence.
///
/// Order: numeric univariate (Age, Fare; distribution then boxplot each),
/// categorical univariate (Sex, Pclass, Embarked, Survived), the four
/// bivariate figures against `Survived`, the correlation heatmap, and the
/// scatter-plot matrix. 14 charts in total.
pub fn render_all(df: &DataFrame, out_dir: &Path) -> Result<Vec<Chart>> {
    let mut charts = Vec::with_capacity(14);
    charts.extend(univariate::render(df, out_dir)?);
    charts.extend(bivariate::render(df, out_dir)?);
    charts.push(correlation::heatmap(df, out_dir)?);
    charts.push(correlation::pairplot(df, out_dir)?);
    Ok(charts)
}

// ---------------------------------------------------------------------------
// Column access
// ---------------------------------------------------------------------------

/// Look up a required column, raising a schema error naming it when absent.
pub(crate) fn require_column<'a>(
    df: &'a DataFrame,
    name: &str,
    stage: &'static str,
) -> Result<&'a crate::data::model::Column> {
    df.column(name)
        .ok_or_else(|| EdaError::schema(name, stage).into())
}

/// Distinct present values of a column in analysis order: first appearance,
/// unless every present value is an integer (ordinal), then ascending.
pub(crate) fn category_levels(values: &[Value]) -> Vec<Value> {
    let mut levels: Vec<Value> = Vec::new();
    let mut all_int = true;
    for v in values {
        if v.is_null() {
            continue;
        }
        if !matches!(v, Value::Int(_)) {
            all_int = false;
        }
        if !levels.contains(v) {
            levels.push(v.clone());
        }
    }
    if all_int {
        levels.sort_by_key(|v| match v {
            Value::Int(i) => *i,
            _ => 0,
        });
    }
    levels
}

/// Count occurrences of each level, in level order.
pub(crate) fn level_counts(values: &[Value], levels: &[Value]) -> Vec<u32> {
    levels
        .iter()
        .map(|lv| values.iter().filter(|v| *v == lv).count() as u32)
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

/// Equal-width histogram bins over `values`.
#[derive(Debug, Clone)]
pub(crate) struct Bins {
    pub min: f64,
    pub width: f64,
    pub counts: Vec<u32>,
}

impl Bins {
    pub fn edges(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.counts.len()).map(move |i| {
            let lo = self.min + i as f64 * self.width;
            (lo, lo + self.width)
        })
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Count values that fall into pre-existing bin edges (used when several
    /// series share one binning).
    pub fn count_into(&self, values: &[f64]) -> Bins {
        let mut counts = vec![0u32; self.counts.len()];
        for &v in values {
            let idx = ((v - self.min) / self.width).floor() as isize;
            let idx = idx.clamp(0, self.counts.len() as isize - 1) as usize;
            counts[idx] += 1;
        }
        Bins {
            min: self.min,
            width: self.width,
            counts,
        }
    }
}

/// Bin values with the Freedman–Diaconis width, falling back to Sturges when
/// the IQR is degenerate. `None` when there are no values.
pub(crate) fn bin(values: &[f64]) -> Option<Bins> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= 0.0 {
        return Some(Bins {
            min: min - 0.5,
            width: 1.0,
            counts: vec![values.len() as u32],
        });
    }

    let n = values.len() as f64;
    let iqr = stats::quantile(values, 0.75)? - stats::quantile(values, 0.25)?;
    let fd_width = 2.0 * iqr / n.cbrt();
    let n_bins = if fd_width > 0.0 {
        (span / fd_width).ceil() as usize
    } else {
        // Sturges
        (n.log2().ceil() as usize) + 1
    };
    let n_bins = n_bins.clamp(1, 50);
    let width = span / n_bins as f64;

    let mut counts = vec![0u32; n_bins];
    for &v in values {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    Some(Bins { min, width, counts })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// Gaussian KDE evaluated on an evenly spaced grid over `[lo, hi]`, with
/// Scott's-rule bandwidth, scaled by `scale` (pass `n * bin_width` to overlay
/// the curve on a count histogram). Empty for fewer than 2 values.
pub(crate) fn kde_curve(values: &[f64], lo: f64, hi: f64, scale: f64) -> Vec<(f64, f64)> {
    if values.len() < 2 || hi <= lo {
        return Vec::new();
    }
    let n = values.len() as f64;
    let sd = match stats::std_dev(values) {
        Some(s) if s > 0.0 => s,
        _ => return Vec::new(),
    };
    let bandwidth = sd * n.powf(-0.2);

    const GRID: usize = 200;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    (0..=GRID)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / GRID as f64;
            let density: f64 = values
                .iter()
                .map(|&v| {
                    let z = (x - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum::<f64>()
                * norm;
            (x, density * scale)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_levels_first_appearance_for_strings() {
        let vals = vec![
            Value::Str("male".into()),
            Value::Str("female".into()),
            Value::Null,
            Value::Str("male".into()),
        ];
        let levels = category_levels(&vals);
        assert_eq!(
            levels,
            vec![Value::Str("male".into()), Value::Str("female".into())]
        );
        assert_eq!(level_counts(&vals, &levels), vec![2, 1]);
    }

    #[test]
    fn category_levels_ascending_for_integers() {
        let vals = vec![Value::Int(3), Value::Int(1), Value::Int(3), Value::Int(2)];
        assert_eq!(
            category_levels(&vals),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn bins_cover_all_values() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = bin(&values).unwrap();
        assert_eq!(bins.counts.iter().sum::<u32>(), 100);
        assert!(bins.counts.len() >= 2 && bins.counts.len() <= 50);
    }

    #[test]
    fn degenerate_bins_hold_everything() {
        let bins = bin(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!(bins.counts, vec![3]);
    }

    #[test]
    fn shared_binning_partitions_exactly() {
        let all = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let bins = bin(&all).unwrap();
        let a = bins.count_into(&[1.0, 3.0, 5.0]);
        let b = bins.count_into(&[2.0, 4.0, 6.0]);
        let total: u32 = a.counts.iter().sum::<u32>() + b.counts.iter().sum::<u32>();
        assert_eq!(total, 6);
    }

    #[test]
    fn kde_is_positive_and_bounded_grid() {
        let values = [1.0, 2.0, 2.5, 3.0, 5.0];
        let curve = kde_curve(&values, 0.0, 6.0, 1.0);
        assert_eq!(curve.len(), 201);
        assert!(curve.iter().all(|(_, y)| *y >= 0.0));
    }

    #[test]
    fn kde_degenerate_inputs_are_empty() {
        assert!(kde_curve(&[1.0], 0.0, 1.0, 1.0).is_empty());
        assert!(kde_curve(&[2.0, 2.0], 0.0, 1.0, 1.0).is_empty());
    }
}
