use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use plotters::prelude::*;

use crate::color::generate_palette;
use crate::data::model::DataFrame;

use super::{
    bin, category_levels, kde_curve, level_counts, require_column, Chart, CATEGORICAL_COLS,
    FIGURE_SIZE, NUMERIC_COLS,
};

const STAGE: &str = "univariate analysis";

// ---------------------------------------------------------------------------
// Stage driver
// ---------------------------------------------------------------------------

/// Render the univariate figures: distribution + boxplot for each numeric
/// column, count chart for each categorical column. The schema is checked
/// for every analysed column before the first chart is drawn.
pub fn render(df: &DataFrame, out_dir: &Path) -> Result<Vec<Chart>> {
    for name in NUMERIC_COLS.iter().chain(CATEGORICAL_COLS.iter()) {
        require_column(df, name, STAGE)?;
    }

    let mut charts = Vec::new();

    for name in NUMERIC_COLS {
        let values = require_column(df, name, STAGE)?.numeric_values();

        let title = format!("Distribution of {name}");
        let file = out_dir.join(format!("{name}_dist.png"));
        distribution(&values, name, &title, &file)?;
        info!("rendered {}", file.display());
        charts.push(Chart { title, file });

        let title = format!("Boxplot of {name}");
        let file = out_dir.join(format!("{name}_box.png"));
        boxplot(&values, name, &title, &file)?;
        info!("rendered {}", file.display());
        charts.push(Chart { title, file });
    }

    for name in CATEGORICAL_COLS {
        let col = require_column(df, name, STAGE)?;
        let levels = category_levels(&col.values);
        let labels: Vec<String> = levels.iter().map(ToString::to_string).collect();
        let counts = level_counts(&col.values, &levels);

        let title = format!("Count of {name}");
        let file = out_dir.join(format!("{name}_count.png"));
        count_chart(&labels, &counts, name, &title, &file)?;
        info!("rendered {}", file.display());
        charts.push(Chart { title, file });
    }

    Ok(charts)
}

// ---------------------------------------------------------------------------
// Histogram with density overlay
// ---------------------------------------------------------------------------

fn distribution(values: &[f64], name: &str, title: &str, out_path: &Path) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let Some(bins) = bin(values) else {
        // Nothing to draw; keep the empty figure rather than failing.
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    };

    let x_lo = bins.min;
    let x_hi = bins.min + bins.width * bins.counts.len() as f64;
    let kde = kde_curve(values, x_lo, x_hi, values.len() as f64 * bins.width);
    let kde_max = kde.iter().map(|(_, y)| *y).fold(0.0f64, f64::max);
    let y_max = (bins.max_count() as f64).max(kde_max) * 1.05;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc(name)
        .y_desc("Count")
        .draw()?;

    chart.draw_series(bins.edges().zip(bins.counts.iter()).map(|((lo, hi), &c)| {
        Rectangle::new([(lo, 0.0), (hi, c as f64)], BLUE.mix(0.45).filled())
    }))?;

    if !kde.is_empty() {
        chart.draw_series(LineSeries::new(kde, BLUE.stroke_width(2)))?;
    }

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Boxplot
// ---------------------------------------------------------------------------

fn boxplot(values: &[f64], name: &str, title: &str, out_path: &Path) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    if values.is_empty() {
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min) as f32;
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max) as f32;
    let pad = ((max - min) * 0.05).max(0.5);

    let quartiles = Quartiles::new(values);

    // A plain unit y-axis with the axis hidden; a one-segment segmented axis
    // trips the mesh key-point computation.
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((min - pad)..(max + pad), 0f32..1f32)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .disable_y_axis()
        .x_desc(name)
        .draw()?;

    chart.draw_series(std::iter::once(
        Boxplot::new_horizontal(0.5f32, &quartiles).width(140),
    ))?;

    // Points beyond the 1.5 IQR whisker fences, the way seaborn marks them.
    let q = quartiles.values();
    let iqr = q[3] - q[1];
    let (lo_fence, hi_fence) = (q[1] - 1.5 * iqr, q[3] + 1.5 * iqr);
    chart.draw_series(
        values
            .iter()
            .map(|&v| v as f32)
            .filter(|&v| v < lo_fence || v > hi_fence)
            .map(|v| Circle::new((v, 0.5f32), 3, BLACK.mix(0.6).filled())),
    )?;

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Categorical count chart
// ---------------------------------------------------------------------------

fn count_chart(
    labels: &[String],
    counts: &[u32],
    name: &str,
    title: &str,
    out_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    if labels.is_empty() {
        root.present().with_context(|| render_failed(title))?;
        return Ok(());
    }

    let y_max = counts.iter().copied().max().unwrap_or(0).max(1);
    let y_max = y_max + y_max / 10 + 1;
    let colors = generate_palette(labels.len());

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..labels.len() as u32).into_segmented(), 0u32..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            _ => String::new(),
        })
        .x_labels(labels.len())
        .x_desc(name)
        .y_desc("Count")
        .draw()?;

    for (i, (&count, color)) in counts.iter().zip(&colors).enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(color.mix(0.85).filled())
                .margin(15)
                .data(std::iter::once((i as u32, count))),
        )?;
    }

    root.present().with_context(|| render_failed(title))?;
    Ok(())
}

fn render_failed(title: &str) -> String {
    format!("failed to write chart '{title}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};
    use crate::error::EdaError;

    fn frame() -> DataFrame {
        let ages: Vec<Value> = (0..20).map(|i| Value::Int(20 + i)).collect();
        let fares: Vec<Value> = (0..20).map(|i| Value::Float(7.0 + i as f64 * 3.5)).collect();
        let sexes: Vec<Value> = (0..20)
            .map(|i| Value::Str(if i % 3 == 0 { "female" } else { "male" }.into()))
            .collect();
        let pclass: Vec<Value> = (0..20).map(|i| Value::Int(3 - (i % 3))).collect();
        let embarked: Vec<Value> = (0..20)
            .map(|i| Value::Str(["S", "C", "Q"][i % 3].into()))
            .collect();
        let survived: Vec<Value> = (0..20).map(|i| Value::Int(i % 2)).collect();
        DataFrame::new(vec![
            Column::new("Age", ages),
            Column::new("Fare", fares),
            Column::new("Sex", sexes),
            Column::new("Pclass", pclass),
            Column::new("Embarked", embarked),
            Column::new("Survived", survived),
        ])
    }

    #[test]
    fn renders_eight_charts_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let charts = render(&frame(), dir.path()).unwrap();
        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Distribution of Age",
                "Boxplot of Age",
                "Distribution of Fare",
                "Boxplot of Fare",
                "Count of Sex",
                "Count of Pclass",
                "Count of Embarked",
                "Count of Survived",
            ]
        );
        for c in &charts {
            assert!(c.file.exists(), "missing {}", c.file.display());
        }
    }

    #[test]
    fn boxplot_renders_without_a_visible_y_axis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("age_box.png");
        let values: Vec<f64> = (0..30).map(|i| 18.0 + i as f64).collect();
        boxplot(&values, "Age", "Boxplot of Age", &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_column_fails_before_any_chart() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = frame();
        df.drop_column("Embarked");
        let err = render(&df, dir.path()).unwrap_err();
        match err.downcast_ref::<EdaError>() {
            Some(EdaError::Schema { column, .. }) => assert_eq!(column, "Embarked"),
            other => panic!("expected Schema error, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
