use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::color::{diverging, generate_palette};
use crate::data::model::{DataFrame, Value};
use crate::stats::{correlation_matrix, CorrelationMatrix};

use super::{bin, require_column, Chart, FIGURE_SIZE, MATRIX_SIZE};

const STAGE: &str = "correlation analysis";

/// Columns of the scatter-plot matrix, in grid order.
pub const PAIRPLOT_COLS: [&str; 4] = ["Survived", "Pclass", "Age", "Fare"];

// ---------------------------------------------------------------------------
// Annotated heatmap
// ---------------------------------------------------------------------------

/// Pearson correlation heatmap over every numeric-dtype column, cell values
/// printed, diverging colour scale centred at zero.
pub fn heatmap(df: &DataFrame, out_dir: &Path) -> Result<Chart> {
    let title = "Correlation Heatmap".to_string();
    let file = out_dir.join("heatmap.png");

    let matrix = correlation_matrix(df);
    draw_heatmap(&matrix, &title, &file)?;
    info!("rendered {}", file.display());
    Ok(Chart { title, file })
}

fn draw_heatmap(matrix: &CorrelationMatrix, title: &str, out_path: &Path) -> Result<()> {
    let n = matrix.names.len();

    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    if n == 0 {
        warn!("no numeric columns, heatmap left empty");
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(
            (0u32..n as u32).into_segmented(),
            (0u32..n as u32).into_segmented(),
        )?;

    let names = matrix.names.clone();
    let names_y = names.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_label_formatter(&move |seg| match seg {
            SegmentValue::CenterOf(j) => names.get(*j as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&move |seg| match seg {
            // The axis probes positions past the last segment; those get no
            // label rather than an underflowing index.
            SegmentValue::CenterOf(k) => (n as u32)
                .checked_sub(k + 1)
                .and_then(|idx| names_y.get(idx as usize).cloned())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_labels(n)
        .y_labels(n)
        .draw()?;

    // Row 0 of the matrix sits at the top of the plot.
    chart.draw_series((0..n).flat_map(|i| {
        let row = &matrix.values[i];
        (0..n).map(move |j| {
            let y = (n - 1 - i) as u32;
            Rectangle::new(
                [
                    (SegmentValue::Exact(j as u32), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(j as u32 + 1), SegmentValue::Exact(y + 1)),
                ],
                diverging(row[j]).filled(),
            )
        })
    }))?;

    let annotation = TextStyle::from(("sans-serif", 16).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series((0..n).flat_map(|i| {
        let row = matrix.values[i].clone();
        let style = annotation.clone();
        (0..n).map(move |j| {
            let y = (n - 1 - i) as u32;
            Text::new(
                format!("{:.2}", row[j]),
                (
                    SegmentValue::CenterOf(j as u32),
                    SegmentValue::CenterOf(y),
                ),
                style.clone(),
            )
        })
    }))?;

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Scatter-plot matrix
// ---------------------------------------------------------------------------

/// Coerce the four pairplot columns to numeric and keep only the rows that
/// are complete in all four. Row order is preserved.
pub(crate) fn pairplot_rows(df: &DataFrame) -> Result<Vec<[f64; 4]>> {
    let mut series: Vec<&[Value]> = Vec::with_capacity(PAIRPLOT_COLS.len());
    for name in PAIRPLOT_COLS {
        series.push(&require_column(df, name, STAGE)?.values);
    }
    let n_rows = series.first().map_or(0, |s| s.len());
    let mut rows = Vec::new();
    'rows: for r in 0..n_rows {
        let mut row = [0.0; 4];
        for (slot, col) in row.iter_mut().zip(&series) {
            match col[r].as_f64() {
                Some(v) => *slot = v,
                None => continue 'rows,
            }
        }
        rows.push(row);
    }
    Ok(rows)
}

/// 4x4 scatter-plot matrix over `Survived, Pclass, Age, Fare`: histograms on
/// the diagonal, pairwise scatters elsewhere, points coloured by `Survived`.
/// An empty selection renders blank panels instead of failing.
pub fn pairplot(df: &DataFrame, out_dir: &Path) -> Result<Chart> {
    let title = "Pairplot of Selected Features".to_string();
    let file = out_dir.join("pairplot.png");

    let rows = pairplot_rows(df)?;
    draw_pairplot(&rows, &title, &file)?;
    info!("rendered {}", file.display());
    Ok(Chart { title, file })
}

fn draw_pairplot(rows: &[[f64; 4]], title: &str, out_path: &Path) -> Result<()> {
    let root = BitMapBackend::new(out_path, MATRIX_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let titled = root.titled(title, ("sans-serif", 28))?;
    let panels = titled.split_evenly((4, 4));

    if rows.is_empty() {
        warn!("pairplot selection left no complete rows, rendering empty grid");
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    // Survival groups drive the point colours.
    let mut groups: Vec<i64> = rows.iter().map(|r| r[0] as i64).collect();
    groups.sort_unstable();
    groups.dedup();
    let colors = generate_palette(groups.len());

    let ranges: Vec<(f64, f64)> = (0..4)
        .map(|v| {
            let lo = rows.iter().map(|r| r[v]).fold(f64::INFINITY, f64::min);
            let hi = rows.iter().map(|r| r[v]).fold(f64::NEG_INFINITY, f64::max);
            let pad = ((hi - lo) * 0.05).max(0.5);
            (lo - pad, hi + pad)
        })
        .collect();

    for (row_idx, var_y) in PAIRPLOT_COLS.iter().enumerate() {
        for (col_idx, var_x) in PAIRPLOT_COLS.iter().enumerate() {
            let panel = &panels[row_idx * 4 + col_idx];
            let (x_lo, x_hi) = ranges[col_idx];

            if row_idx == col_idx {
                diagonal_histogram(panel, &rows, col_idx, var_x)?;
                continue;
            }

            let (y_lo, y_hi) = ranges[row_idx];
            let mut chart = ChartBuilder::on(panel)
                .margin(6)
                .x_label_area_size(22)
                .y_label_area_size(34)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
            chart
                .configure_mesh()
                .x_desc(*var_x)
                .y_desc(*var_y)
                .x_labels(4)
                .y_labels(4)
                .draw()?;

            for (group, color) in groups.iter().zip(&colors) {
                chart.draw_series(
                    rows.iter()
                        .filter(|r| r[0] as i64 == *group)
                        .map(|r| Circle::new((r[col_idx], r[row_idx]), 3, color.mix(0.7).filled())),
                )?;
            }
        }
    }

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

fn diagonal_histogram<DB: DrawingBackend>(
    panel: &DrawingArea<DB, plotters::coord::Shift>,
    rows: &[[f64; 4]],
    var: usize,
    name: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let values: Vec<f64> = rows.iter().map(|r| r[var]).collect();
    let Some(bins) = bin(&values) else {
        return Ok(());
    };

    let x_lo = bins.min;
    let x_hi = bins.min + bins.width * bins.counts.len() as f64;
    let y_max = bins.max_count().max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(panel)
        .margin(6)
        .x_label_area_size(22)
        .y_label_area_size(34)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;
    chart
        .configure_mesh()
        .x_desc(name)
        .x_labels(4)
        .y_labels(4)
        .draw()?;

    chart.draw_series(bins.edges().zip(bins.counts.iter()).map(|((lo, hi), &c)| {
        Rectangle::new([(lo, 0.0), (hi, c as f64)], BLUE.mix(0.5).filled())
    }))?;
    Ok(())
}

fn render_failed(title: &str) -> String {
    format!("failed to write chart '{title}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use crate::error::EdaError;

    fn frame() -> DataFrame {
        let n = 12;
        DataFrame::new(vec![
            Column::new("Survived", (0..n).map(|i| Value::Int(i % 2)).collect()),
            Column::new("Pclass", (0..n).map(|i| Value::Int(1 + i % 3)).collect()),
            Column::new("Age", (0..n).map(|i| Value::Int(20 + i)).collect()),
            Column::new(
                "Fare",
                (0..n).map(|i| Value::Float(8.0 + i as f64 * 2.0)).collect(),
            ),
            Column::new(
                "Name",
                (0..n).map(|i| Value::Str(format!("p{i}"))).collect(),
            ),
        ])
    }

    #[test]
    fn heatmap_renders_over_numeric_columns() {
        let dir = tempfile::tempdir().unwrap();
        let chart = heatmap(&frame(), dir.path()).unwrap();
        assert_eq!(chart.title, "Correlation Heatmap");
        assert!(chart.file.exists());
    }

    #[test]
    fn pairplot_rows_drop_incomplete_rows() {
        let mut df = frame();
        df.column_mut("Age").unwrap().values[3] = Value::Null;
        df.column_mut("Fare").unwrap().values[5] = Value::Str("unknown".into());
        let rows = pairplot_rows(&df).unwrap();
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn pairplot_missing_column_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = frame();
        df.drop_column("Pclass");
        let err = pairplot(&df, dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EdaError>(),
            Some(EdaError::Schema { .. })
        ));
    }

    #[test]
    fn pairplot_with_zero_rows_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = frame();
        for v in df.column_mut("Age").unwrap().values.iter_mut() {
            *v = Value::Null;
        }
        let chart = pairplot(&df, dir.path()).unwrap();
        assert!(chart.file.exists());
    }

    #[test]
    fn pairplot_renders_with_data() {
        let dir = tempfile::tempdir().unwrap();
        let chart = pairplot(&frame(), dir.path()).unwrap();
        assert!(chart.file.exists());
        assert_eq!(chart.title, "Pairplot of Selected Features");
    }
}
