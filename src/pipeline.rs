//! Stage orchestration shared by both binaries: load, inspect, clean, render
//! the fixed chart sequence, and (for the report binary) assemble the
//! document. Strictly sequential; the first error aborts the whole run.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::charts::{self, Chart};
use crate::data::clean::{self, CleanSummary};
use crate::data::loader;
use crate::data::model::DataFrame;
use crate::inspect::{self, DESCRIBE_STATS};
use crate::report::Document;

/// Fixed input file, resolved against the working directory.
pub const INPUT_FILE: &str = "titanic.csv";

/// Fixed report output name.
pub const REPORT_FILE: &str = "titanic_eda_report.html";

/// The fixed closing commentary, printed to the console and embedded in
/// the report.
pub const INSIGHTS: [&str; 7] = [
    "1. Most passengers were in 3rd class.",
    "2. Majority of passengers were male, but survival rate was higher for females.",
    "3. Younger passengers had slightly better survival chances.",
    "4. Higher fares were associated with higher survival rates.",
    "5. Pclass is strongly correlated with survival - 1st class had better survival rates.",
    "6. Age distribution is slightly right-skewed.",
    "7. Fare distribution has a long tail with outliers (very high fares).",
];

// ---------------------------------------------------------------------------
// Pipeline result
// ---------------------------------------------------------------------------

/// Everything one full run produces. Inspection snapshots describe the frame
/// as loaded, before cleaning, which is what both binaries report.
#[derive(Debug)]
pub struct Analysis {
    /// Row/column shape of the raw frame.
    pub n_rows: usize,
    pub n_cols: usize,
    pub column_names: Vec<String>,
    pub head_text: String,
    pub info_text: String,
    pub describe_text: String,
    pub describe: inspect::DescribeTable,
    pub missing: Vec<(String, usize)>,
    pub clean_summary: CleanSummary,
    /// The cleaned frame the charts were rendered from.
    pub df: DataFrame,
    /// All rendered charts, in the fixed report order.
    pub charts: Vec<Chart>,
}

/// Run the whole pipeline: load `input`, snapshot the inspection output,
/// clean in place, and render every chart into `charts_dir`.
pub fn run(input: &Path, charts_dir: &Path) -> Result<Analysis> {
    info!("loading {}", input.display());
    let mut df = loader::load_csv(input).context("load stage failed")?;

    info!("inspecting raw frame: {} rows, {} columns", df.n_rows(), df.n_cols());
    let head_text = inspect::head(&df, 5);
    let info_text = inspect::info(&df);
    let describe_text = inspect::describe_text(&df);
    let describe = inspect::describe(&df);
    let missing = inspect::missing_counts(&df);
    let n_rows = df.n_rows();
    let n_cols = df.n_cols();
    let column_names: Vec<String> = df.column_names().iter().map(|s| s.to_string()).collect();

    info!("cleaning missing values");
    let clean_summary = clean::clean(&mut df).context("cleaning stage failed")?;

    info!("rendering charts into {}", charts_dir.display());
    let charts = charts::render_all(&df, charts_dir).context("chart rendering failed")?;

    Ok(Analysis {
        n_rows,
        n_cols,
        column_names,
        head_text,
        info_text,
        describe_text,
        describe,
        missing,
        clean_summary,
        df,
        charts,
    })
}

// ---------------------------------------------------------------------------
// Report assembly
// ---------------------------------------------------------------------------

/// Assemble the Report Document from a finished run: header facts, the two
/// summary tables, every chart in pipeline order, then the insights block.
pub fn build_report(analysis: &Analysis) -> Document {
    let mut doc = Document::new("Titanic Dataset EDA Report");

    doc.paragraph(format!("Total Rows: {}", analysis.n_rows))
        .paragraph(format!("Total Columns: {}", analysis.n_cols))
        .spacer();

    doc.heading(2, "Columns")
        .paragraph(analysis.column_names.join(", "))
        .spacer();

    doc.heading(2, "Missing Values").table(
        vec!["Column".into(), "Missing Count".into()],
        analysis
            .missing
            .iter()
            .map(|(name, count)| vec![name.clone(), count.to_string()])
            .collect(),
    );
    doc.spacer();

    doc.heading(2, "Summary Statistics").table(
        std::iter::once(String::new())
            .chain(analysis.describe.columns.iter().cloned())
            .collect(),
        DESCRIBE_STATS
            .iter()
            .zip(&analysis.describe.cells)
            .map(|(label, row)| {
                std::iter::once(label.to_string())
                    .chain(row.iter().cloned())
                    .collect()
            })
            .collect(),
    );

    for chart in &analysis.charts {
        let (width, height) = if chart.title.starts_with("Pairplot") {
            (400, 400)
        } else {
            (400, 250)
        };
        doc.heading(3, chart.title.clone())
            .image(chart.file.clone(), width, height);
    }

    doc.spacer().heading(2, "Summary of Insights");
    for line in INSIGHTS {
        doc.paragraph(line);
    }

    doc
}
