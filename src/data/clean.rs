use anyhow::Result;
use log::{debug, info};

use crate::error::EdaError;
use crate::stats;

use super::model::{DataFrame, Value};

// ---------------------------------------------------------------------------
// Missing-value handling
// ---------------------------------------------------------------------------

const STAGE: &str = "cleaning";

/// What the cleaner did: fill values it computed and whether `Cabin` existed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSummary {
    pub age_fill: f64,
    pub embarked_fill: Value,
    pub dropped_cabin: bool,
}

/// Fill missing values and drop the mostly-empty `Cabin` column, in place.
///
/// * `Age` nulls become the median of the present `Age` values;
/// * `Embarked` nulls become the most frequent present value (ties go to the
///   value seen first in column order);
/// * `Cabin` is removed when present; its absence is not an error.
///
/// Both fill values are computed before any cell is written, so re-running on
/// an already-clean frame changes nothing. Row count and every other column
/// are left untouched.
pub fn clean(df: &mut DataFrame) -> Result<CleanSummary> {
    let age_fill = {
        let age = df
            .column("Age")
            .ok_or_else(|| EdaError::schema("Age", STAGE))?;
        let present = age.numeric_values();
        stats::median(&present).ok_or_else(|| EdaError::InsufficientData {
            column: "Age".into(),
            what: "median is undefined, no non-missing values".into(),
        })?
    };

    let embarked_fill = {
        let embarked = df
            .column("Embarked")
            .ok_or_else(|| EdaError::schema("Embarked", STAGE))?;
        stats::mode(&embarked.values).ok_or_else(|| EdaError::InsufficientData {
            column: "Embarked".into(),
            what: "mode is undefined, no non-missing values".into(),
        })?
    };

    fill_nulls(df, "Age", Value::Float(age_fill));
    fill_nulls(df, "Embarked", embarked_fill.clone());

    let dropped_cabin = df.drop_column("Cabin");
    if dropped_cabin {
        info!("dropped 'Cabin' column");
    } else {
        debug!("'Cabin' column not present, nothing to drop");
    }

    Ok(CleanSummary {
        age_fill,
        embarked_fill,
        dropped_cabin,
    })
}

fn fill_nulls(df: &mut DataFrame, name: &str, fill: Value) {
    // Callers have already checked the column exists.
    if let Some(col) = df.column_mut(name) {
        let n = col.null_count();
        for v in col.values.iter_mut() {
            if v.is_null() {
                *v = fill.clone();
            }
        }
        if n > 0 {
            info!("filled {n} missing '{name}' values with {fill}");
        }
    }
}
