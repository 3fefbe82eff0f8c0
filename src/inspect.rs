//! Read-only inspection of a loaded frame: row preview, schema description,
//! summary statistics, and missing-value counts. Everything here formats text
//! or builds small tables; nothing mutates the data.

use std::fmt::Write as _;

use crate::data::model::DataFrame;
use crate::stats;

/// Cells wider than this are truncated in the preview.
const MAX_CELL_WIDTH: usize = 18;

/// Labels of the eight `describe` statistics, in output order.
pub const DESCRIBE_STATS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

// ---------------------------------------------------------------------------
// Row preview
// ---------------------------------------------------------------------------

/// Fixed-width preview of the first `n` rows.
pub fn head(df: &DataFrame, n: usize) -> String {
    let n = n.min(df.n_rows());

    let mut widths: Vec<usize> = Vec::with_capacity(df.n_cols());
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.n_cols());
    for col in df.columns() {
        let rendered: Vec<String> = col.values[..n].iter().map(|v| clip(&v.to_string())).collect();
        let w = rendered
            .iter()
            .map(String::len)
            .chain(std::iter::once(clip(&col.name).len()))
            .max()
            .unwrap_or(0);
        widths.push(w);
        cells.push(rendered);
    }

    let mut out = String::new();
    for (col, w) in df.columns().iter().zip(&widths) {
        let _ = write!(out, "{:>w$}  ", clip(&col.name), w = w);
    }
    out.push('\n');
    for row in 0..n {
        for (col_cells, w) in cells.iter().zip(&widths) {
            let _ = write!(out, "{:>w$}  ", col_cells[row], w = w);
        }
        out.push('\n');
    }
    out
}

fn clip(s: &str) -> String {
    if s.chars().count() > MAX_CELL_WIDTH {
        let clipped: String = s.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{clipped}…")
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Schema description
// ---------------------------------------------------------------------------

/// Per-column name, non-null count, and inferred dtype, plus frame totals.
pub fn info(df: &DataFrame) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "RangeIndex: {} entries, {} columns",
        df.n_rows(),
        df.n_cols()
    );
    let name_w = df
        .column_names()
        .iter()
        .map(|n| n.len())
        .max()
        .unwrap_or(6)
        .max("Column".len());
    let _ = writeln!(out, " #   {:<name_w$}  Non-Null Count  Dtype", "Column");
    for (i, col) in df.columns().iter().enumerate() {
        let _ = writeln!(
            out,
            " {:<3} {:<name_w$}  {:>8} non-null  {}",
            i,
            col.name,
            col.non_null_count(),
            col.dtype()
        );
    }
    out
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// `describe`-style summary over the numeric columns.
/// `cells[stat_index][column_index]`, indexed in [`DESCRIBE_STATS`] order.
#[derive(Debug, Clone)]
pub struct DescribeTable {
    pub columns: Vec<String>,
    pub cells: Vec<Vec<String>>,
}

pub fn describe(df: &DataFrame) -> DescribeTable {
    let columns: Vec<String> = df
        .numeric_column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::with_capacity(columns.len()); 8];
    for name in &columns {
        let values = df.column(name).map(|c| c.numeric_values()).unwrap_or_default();
        let row: [Option<f64>; 8] = [
            Some(values.len() as f64),
            stats::mean(&values),
            stats::std_dev(&values),
            stats::quantile(&values, 0.0),
            stats::quantile(&values, 0.25),
            stats::quantile(&values, 0.5),
            stats::quantile(&values, 0.75),
            stats::quantile(&values, 1.0),
        ];
        for (slot, stat) in cells.iter_mut().zip(row) {
            slot.push(stat.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}")));
        }
    }

    DescribeTable { columns, cells }
}

/// Render the describe table as fixed-width console text.
pub fn describe_text(df: &DataFrame) -> String {
    let table = describe(df);
    let mut out = String::new();
    let _ = write!(out, "{:>6}", "");
    for name in &table.columns {
        let _ = write!(out, "  {:>12}", clip(name));
    }
    out.push('\n');
    for (label, row) in DESCRIBE_STATS.iter().zip(&table.cells) {
        let _ = write!(out, "{label:>6}");
        for cell in row {
            let _ = write!(out, "  {cell:>12}");
        }
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Missing values
// ---------------------------------------------------------------------------

/// Per-column missing-entry counts, in frame order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect()
}

pub fn missing_counts_text(df: &DataFrame) -> String {
    let counts = missing_counts(df);
    let name_w = counts.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in counts {
        let _ = writeln!(out, "{name:<name_w$}  {count}");
    }
    out
}
