use std::path::Path;

use anyhow::Result;

use crate::error::EdaError;

use super::model::{Column, DataFrame, Value};

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load a delimited table into a [`DataFrame`].
///
/// Expects a header row of column names; every data row must have the same
/// number of fields as the header. Cell types are guessed per cell (empty →
/// null, integer, float, boolean, otherwise string); the column dtype is
/// inferred later from the cells.
///
/// Fails with [`EdaError::DataLoad`] when the file is missing, unreadable, or
/// a row's field count disagrees with the header. Column presence is not
/// validated here; a later stage reports the missing column.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| data_load(path, &e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| data_load(path, &e))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        // The csv crate flags unequal field counts as an error itself.
        let record = result.map_err(|e| data_load(path, &e))?;
        if record.len() != headers.len() {
            return Err(EdaError::DataLoad {
                path: path.display().to_string(),
                reason: format!(
                    "row {row_no} has {} fields, header has {}",
                    record.len(),
                    headers.len()
                ),
            }
            .into());
        }
        for (col, field) in columns.iter_mut().zip(record.iter()) {
            col.push(guess_value(field));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();

    Ok(DataFrame::new(columns))
}

fn data_load(path: &Path, err: &dyn std::fmt::Display) -> anyhow::Error {
    EdaError::DataLoad {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
    .into()
}

/// Guess the type of a single CSV field.
fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::Str(s.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::model::Dtype;

    fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_and_guesses_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "t.csv",
            "Name,Age,Fare\nAlice,22,7.25\nBob,,71.28\n",
        );
        let df = load_csv(&path).unwrap();
        assert_eq!(df.n_rows(), 2);
        assert_eq!(df.n_cols(), 3);
        assert_eq!(df.column("Name").unwrap().dtype(), Dtype::Str);
        assert_eq!(df.column("Age").unwrap().dtype(), Dtype::Int64);
        assert_eq!(df.column("Fare").unwrap().dtype(), Dtype::Float64);
        assert_eq!(df.column("Age").unwrap().null_count(), 1);
    }

    #[test]
    fn missing_file_is_a_data_load_error() {
        let err = load_csv(Path::new("does_not_exist.csv")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EdaError>(),
            Some(EdaError::DataLoad { .. })
        ));
    }

    #[test]
    fn ragged_rows_are_a_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "a,b\n1,2\n3\n");
        let err = load_csv(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EdaError>(),
            Some(EdaError::DataLoad { .. })
        ));
    }
}
