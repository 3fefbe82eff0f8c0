use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use plotters::prelude::*;

use crate::color::generate_palette;
use crate::data::model::{DataFrame, Value};

use super::{bin, category_levels, kde_curve, require_column, Chart, FIGURE_SIZE};

const STAGE: &str = "bivariate analysis";

// ---------------------------------------------------------------------------
// Stage driver
// ---------------------------------------------------------------------------

/// The four fixed analyses relating `Survived` to its predictors, one chart
/// each: Age (grouped boxplots), Sex and Pclass (grouped counts), Fare
/// (overlaid distributions). `Survived` is assumed cleaned upstream.
pub fn render(df: &DataFrame, out_dir: &Path) -> Result<Vec<Chart>> {
    for name in ["Survived", "Age", "Sex", "Pclass", "Fare"] {
        require_column(df, name, STAGE)?;
    }

    let survived = &require_column(df, "Survived", STAGE)?.values;
    let groups = category_levels(survived);

    let mut charts = Vec::new();

    let title = "Age vs Survival".to_string();
    let file = out_dir.join("age_vs_survival.png");
    grouped_boxplot(df, survived, &groups, "Age", &title, &file)?;
    info!("rendered {}", file.display());
    charts.push(Chart { title, file });

    let title = "Survival Count by Sex".to_string();
    let file = out_dir.join("sex_vs_survival.png");
    grouped_counts(df, survived, &groups, "Sex", &title, &file)?;
    info!("rendered {}", file.display());
    charts.push(Chart { title, file });

    let title = "Survival Count by Passenger Class".to_string();
    let file = out_dir.join("pclass_vs_survival.png");
    grouped_counts(df, survived, &groups, "Pclass", &title, &file)?;
    info!("rendered {}", file.display());
    charts.push(Chart { title, file });

    let title = "Fare Distribution by Survival".to_string();
    let file = out_dir.join("fare_vs_survival.png");
    fare_by_survival(df, survived, &title, &file)?;
    info!("rendered {}", file.display());
    charts.push(Chart { title, file });

    Ok(charts)
}

/// Present numeric values of `column` for the rows where `Survived` equals
/// `group`. Rows missing either side are skipped.
fn group_values(df: &DataFrame, survived: &[Value], column: &str, group: &Value) -> Vec<f64> {
    let col = match df.column(column) {
        Some(c) => c,
        None => return Vec::new(),
    };
    col.values
        .iter()
        .zip(survived)
        .filter(|(_, s)| *s == group)
        .filter_map(|(v, _)| v.as_f64())
        .collect()
}

// ---------------------------------------------------------------------------
// Boxplots grouped by survival
// ---------------------------------------------------------------------------

fn grouped_boxplot(
    df: &DataFrame,
    survived: &[Value],
    groups: &[Value],
    column: &str,
    title: &str,
    out_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let per_group: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| group_values(df, survived, column, g))
        .collect();

    let all: Vec<f64> = per_group.iter().flatten().copied().collect();
    if all.is_empty() {
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    let min = all.iter().copied().fold(f64::INFINITY, f64::min) as f32;
    let max = all.iter().copied().fold(f64::NEG_INFINITY, f64::max) as f32;
    let pad = ((max - min) * 0.05).max(0.5);
    let labels: Vec<String> = groups.iter().map(ToString::to_string).collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..groups.len() as u32).into_segmented(),
            (min - pad)..(max + pad),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .x_labels(groups.len())
        .x_desc("Survived")
        .y_desc(column)
        .draw()?;

    chart.draw_series(per_group.iter().enumerate().filter_map(|(i, values)| {
        if values.is_empty() {
            return None;
        }
        let q = Quartiles::new(values);
        Some(Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &q).width(100))
    }))?;

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Counts grouped by survival
// ---------------------------------------------------------------------------

fn grouped_counts(
    df: &DataFrame,
    survived: &[Value],
    groups: &[Value],
    column: &str,
    title: &str,
    out_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let col = require_column(df, column, STAGE)?;
    let levels = category_levels(&col.values);
    let labels: Vec<String> = levels.iter().map(ToString::to_string).collect();
    if levels.is_empty() || groups.is_empty() {
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    // counts[level][group]
    let counts: Vec<Vec<u32>> = levels
        .iter()
        .map(|lv| {
            groups
                .iter()
                .map(|g| {
                    col.values
                        .iter()
                        .zip(survived)
                        .filter(|(v, s)| *v == lv && *s == g)
                        .count() as u32
                })
                .collect()
        })
        .collect();

    let y_max = counts
        .iter()
        .flatten()
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);
    let y_max = y_max + y_max / 10 + 1;

    let n_groups = groups.len() as u32;
    let n_slots = levels.len() as u32 * n_groups;
    let colors = generate_palette(groups.len());

    // One fine segment per (level, group) pair; the label sits under the
    // middle segment of each level's block.
    let label_offset = (n_groups - 1) / 2;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..n_slots).into_segmented(), 0u32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(k) if k % n_groups == label_offset => labels
                .get((k / n_groups) as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_labels(n_slots as usize)
        .x_desc(column)
        .y_desc("Count")
        .draw()?;

    for (g, (group, color)) in groups.iter().zip(&colors).enumerate() {
        let series = counts
            .iter()
            .enumerate()
            .map(|(lv, row)| (lv as u32 * n_groups + g as u32, row[g]));
        let color = *color;
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.mix(0.85).filled())
                    .margin(4)
                    .data(series),
            )?
            .label(format!("Survived = {group}"))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.mix(0.85).filled())
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8).filled())
        .draw()?;

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Fare distribution by survival
// ---------------------------------------------------------------------------

/// The exact two partitions consumed by the Fare chart:
/// `(Fare[Survived == 1], Fare[Survived == 0])`, present values only.
pub(crate) fn fare_partitions(df: &DataFrame, survived: &[Value]) -> (Vec<f64>, Vec<f64>) {
    (
        group_values(df, survived, "Fare", &Value::Int(1)),
        group_values(df, survived, "Fare", &Value::Int(0)),
    )
}

fn fare_by_survival(
    df: &DataFrame,
    survived: &[Value],
    title: &str,
    out_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (fare_survived, fare_lost) = fare_partitions(df, survived);
    let all: Vec<f64> = fare_survived
        .iter()
        .chain(fare_lost.iter())
        .copied()
        .collect();
    let Some(shared) = bin(&all) else {
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    };

    let survived_bins = shared.count_into(&fare_survived);
    let lost_bins = shared.count_into(&fare_lost);

    let x_lo = shared.min;
    let x_hi = shared.min + shared.width * shared.counts.len() as f64;
    let kde_survived = kde_curve(
        &fare_survived,
        x_lo,
        x_hi,
        fare_survived.len() as f64 * shared.width,
    );
    let kde_lost = kde_curve(&fare_lost, x_lo, x_hi, fare_lost.len() as f64 * shared.width);

    let y_max = (survived_bins.max_count().max(lost_bins.max_count()) as f64)
        .max(kde_survived.iter().chain(&kde_lost).map(|(_, y)| *y).fold(0.0, f64::max))
        * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max.max(1.0))?;

    chart
        .configure_mesh()
        .x_desc("Fare")
        .y_desc("Count")
        .draw()?;

    for (bins, kde, color, label) in [
        (&survived_bins, &kde_survived, GREEN, "Survived"),
        (&lost_bins, &kde_lost, RED, "Not Survived"),
    ] {
        chart
            .draw_series(bins.edges().zip(bins.counts.iter()).map(|((lo, hi), &c)| {
                Rectangle::new([(lo, 0.0), (hi, c as f64)], color.mix(0.4).filled())
            }))?
            .label(label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 6), (x + 12, y + 6)], color.mix(0.4).filled())
            });
        if !kde.is_empty() {
            chart.draw_series(LineSeries::new(kde.clone(), color.stroke_width(2)))?;
        }
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8).filled())
        .draw()?;

    root.present().with_context(|| render_failed(title))?;
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
        let n = 24;
        let ages: Vec<Value> = (0..n).map(|i| Value::Int(18 + i)).collect();
        let fares: Vec<Value> = (0..n).map(|i| Value::Float(5.0 + i as f64 * 4.0)).collect();
        let sexes: Vec<Value> = (0..n)
            .map(|i| Value::Str(if i % 2 == 0 { "male" } else { "female" }.into()))
            .collect();
        let pclass: Vec<Value> = (0..n).map(|i| Value::Int(1 + (i % 3))).collect();
        let survived: Vec<Value> = (0..n).map(|i| Value::Int((i % 3 == 0) as i64)).collect();
        DataFrame::new(vec![
            Column::new("Age", ages),
            Column::new("Fare", fares),
            Column::new("Sex", sexes),
            Column::new("Pclass", pclass),
            Column::new("Survived", survived),
        ])
    }

    #[test]
    fn renders_four_charts_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let charts = render(&frame(), dir.path()).unwrap();
        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Age vs Survival",
                "Survival Count by Sex",
                "Survival Count by Passenger Class",
                "Fare Distribution by Survival",
            ]
        );
        for c in &charts {
            assert!(c.file.exists());
        }
    }

    #[test]
    fn fare_partitions_cover_every_row_exactly_once() {
        let df = frame();
        let survived = df.column("Survived").unwrap().values.clone();
        let (ones, zeros) = fare_partitions(&df, &survived);
        assert_eq!(ones.len() + zeros.len(), df.n_rows());
        assert_eq!(ones.len(), 8);
        assert_eq!(zeros.len(), 16);
    }

    #[test]
    fn fare_partitions_skip_missing_fares() {
        let mut df = frame();
        df.column_mut("Fare").unwrap().values[0] = Value::Null;
        let survived = df.column("Survived").unwrap().values.clone();
        let (ones, zeros) = fare_partitions(&df, &survived);
        assert_eq!(ones.len() + zeros.len(), df.n_rows() - 1);
    }

    #[test]
    fn missing_survived_is_a_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = frame();
        df.drop_column("Survived");
        let err = render(&df, dir.path()).unwrap_err();
        match err.downcast_ref::<EdaError>() {
            Some(EdaError::Schema { column, .. }) => assert_eq!(column, "Survived"),
            other => panic!("expected Schema error, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
