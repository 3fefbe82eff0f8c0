//! Descriptive statistics over plain `f64` slices and dynamically-typed cells.
//!
//! Quantiles use linear interpolation between order statistics and the
//! standard deviation is the sample (n-1) estimate, so `describe` output lines
//! up with the conventional DataFrame summary.

use crate::data::model::{DataFrame, Value};

// ---------------------------------------------------------------------------
// Moments
// ---------------------------------------------------------------------------

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n-1 denominator). `None` for fewer than 2 values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

// ---------------------------------------------------------------------------
// Order statistics
// ---------------------------------------------------------------------------

/// Quantile with linear interpolation between the two nearest order
/// statistics. `q` is clamped to [0, 1]. `None` on an empty slice.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Most frequent non-null value. Ties break toward the value encountered
/// first in column order.
pub fn mode(values: &[Value]) -> Option<Value> {
    let mut counts: Vec<(&Value, usize)> = Vec::new();
    for v in values {
        if v.is_null() {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == v) {
            Some((_, n)) => *n += 1,
            None => counts.push((v, 1)),
        }
    }
    // max_by_key keeps the last maximum on ties; scan for a strictly greater
    // count instead so ties resolve to the earliest value.
    let mut best: Option<(&Value, usize)> = None;
    for &(v, n) in &counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((v, n));
        }
    }
    best.map(|(v, _)| v.clone())
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over pairwise-complete observations: rows where either
/// side is `None` are skipped. `None` when fewer than 2 complete pairs remain
/// or either side has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in &pairs {
        cov += (x - mx) * (y - my);
        vx += (x - mx).powi(2);
        vy += (y - my).powi(2);
    }
    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some(cov / (vx.sqrt() * vy.sqrt()))
}

/// Pairwise Pearson correlation matrix over the frame's numeric-dtype columns.
///
/// Symmetric with 1.0 on the diagonal. Cells whose correlation is undefined
/// (zero variance, fewer than 2 complete pairs) are reported as 0.0.
pub struct CorrelationMatrix {
    pub names: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

pub fn correlation_matrix(df: &DataFrame) -> CorrelationMatrix {
    let names: Vec<String> = df
        .numeric_column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let series: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| {
            df.column(name)
                .map(|c| c.values.iter().map(Value::as_f64).collect())
                .unwrap_or_default()
        })
        .collect();

    let n = names.len();
    let mut values = vec![vec![0.0; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]).unwrap_or(0.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix { names, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        let s = std_dev(&v).unwrap();
        assert!((s - 2.138).abs() < 1e-3);
        assert_eq!(mean(&[]), None);
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn quantiles_interpolate() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
    }

    #[test]
    fn median_of_two() {
        assert_eq!(median(&[22.0, 38.0]), Some(30.0));
    }

    #[test]
    fn mode_breaks_ties_by_first_appearance() {
        let vals = vec![
            Value::Str("S".into()),
            Value::Str("C".into()),
            Value::Null,
        ];
        assert_eq!(mode(&vals), Some(Value::Str("S".into())));

        let vals = vec![
            Value::Str("C".into()),
            Value::Str("S".into()),
            Value::Str("S".into()),
        ];
        assert_eq!(mode(&vals), Some(Value::Str("S".into())));
    }

    #[test]
    fn mode_of_all_nulls_is_none() {
        assert_eq!(mode(&[Value::Null, Value::Null]), None);
    }

    #[test]
    fn pearson_perfect_correlation() {
        let xs: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0)];
        let ys: Vec<Option<f64>> = vec![Some(2.0), Some(4.0), Some(6.0)];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let xs: Vec<Option<f64>> = vec![Some(1.0), None, Some(3.0), Some(4.0)];
        let ys: Vec<Option<f64>> = vec![Some(1.0), Some(99.0), Some(3.0), Some(4.0)];
        let r = pearson(&xs, &ys).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_zero_variance_is_none() {
        let xs: Vec<Option<f64>> = vec![Some(1.0), Some(1.0), Some(1.0)];
        let ys: Vec<Option<f64>> = vec![Some(1.0), Some(2.0), Some(3.0)];
        assert_eq!(pearson(&xs, &ys), None);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let df = DataFrame::new(vec![
            Column::new("a", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Column::new("b", vec![Value::Float(3.0), Value::Float(1.0), Value::Float(2.0)]),
            Column::new(
                "label",
                vec![
                    Value::Str("x".into()),
                    Value::Str("y".into()),
                    Value::Str("z".into()),
                ],
            ),
        ]);
        let m = correlation_matrix(&df);
        // Non-numeric columns are excluded automatically.
        assert_eq!(m.names, vec!["a", "b"]);
        for i in 0..m.names.len() {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..m.names.len() {
                assert_eq!(m.values[i][j], m.values[j][i]);
                assert!(m.values[i][j] >= -1.0 && m.values[i][j] <= 1.0);
            }
        }
    }
}
