use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
}

impl Value {
    /// Try to interpret the value as an `f64` for numeric analysis.
    /// Strings and booleans are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Null => write!(f, "NaN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dtype – inferred column type
// ---------------------------------------------------------------------------

/// Column type inferred over the non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    Int64,
    Float64,
    Bool,
    Str,
    /// Column with no non-null cells.
    Null,
}

impl Dtype {
    pub fn is_numeric(self) -> bool {
        matches!(self, Dtype::Int64 | Dtype::Float64)
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dtype::Int64 => "int64",
            Dtype::Float64 => "float64",
            Dtype::Bool => "bool",
            Dtype::Str => "object",
            Dtype::Null => "object",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Column – one named column of the table
// ---------------------------------------------------------------------------

/// A named column: an ordered sequence of cells.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Infer the column dtype from its non-null cells.
    /// An Int/Float mix widens to Float64; any string makes the column object.
    pub fn dtype(&self) -> Dtype {
        let mut seen_int = false;
        let mut seen_float = false;
        let mut seen_bool = false;
        for v in &self.values {
            match v {
                Value::Int(_) => seen_int = true,
                Value::Float(_) => seen_float = true,
                Value::Bool(_) => seen_bool = true,
                Value::Str(_) => return Dtype::Str,
                Value::Null => {}
            }
        }
        if seen_bool {
            if seen_int || seen_float {
                Dtype::Str
            } else {
                Dtype::Bool
            }
        } else if seen_float {
            Dtype::Float64
        } else if seen_int {
            Dtype::Int64
        } else {
            Dtype::Null
        }
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    pub fn non_null_count(&self) -> usize {
        self.len() - self.null_count()
    }

    /// Present numeric cells, in column order. Nulls and non-numerics are skipped.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }
}

// ---------------------------------------------------------------------------
// DataFrame – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table: ordered named columns of equal length.
#[derive(Debug, Clone)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    /// Build a frame from columns. Callers guarantee equal lengths;
    /// the loader enforces it when parsing.
    pub fn new(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].len() == w[1].len()),
            "columns must have equal length"
        );
        DataFrame { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Names of the numeric-dtype columns, in frame order.
    pub fn numeric_column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.dtype().is_numeric())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Remove a column by name. Returns whether it was present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        self.columns.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, values: Vec<Value>) -> Column {
        Column::new(name, values)
    }

    #[test]
    fn dtype_inference_widens_int_to_float() {
        let c = col("x", vec![Value::Int(1), Value::Float(2.5), Value::Null]);
        assert_eq!(c.dtype(), Dtype::Float64);
    }

    #[test]
    fn dtype_inference_all_ints() {
        let c = col("x", vec![Value::Int(1), Value::Null, Value::Int(3)]);
        assert_eq!(c.dtype(), Dtype::Int64);
        assert!(c.dtype().is_numeric());
    }

    #[test]
    fn dtype_inference_any_string_is_object() {
        let c = col("x", vec![Value::Int(1), Value::Str("a".into())]);
        assert_eq!(c.dtype(), Dtype::Str);
        assert!(!c.dtype().is_numeric());
    }

    #[test]
    fn null_counts() {
        let c = col("x", vec![Value::Null, Value::Int(1), Value::Null]);
        assert_eq!(c.null_count(), 2);
        assert_eq!(c.non_null_count(), 1);
    }

    #[test]
    fn numeric_values_skip_nulls_and_strings() {
        let c = col(
            "x",
            vec![
                Value::Int(1),
                Value::Null,
                Value::Str("n/a".into()),
                Value::Float(4.0),
            ],
        );
        assert_eq!(c.numeric_values(), vec![1.0, 4.0]);
    }

    #[test]
    fn drop_column_is_best_effort() {
        let mut df = DataFrame::new(vec![col("a", vec![Value::Int(1)])]);
        assert!(df.drop_column("a"));
        assert!(!df.drop_column("a"));
        assert_eq!(df.n_cols(), 0);
    }

    #[test]
    fn column_lookup_by_name() {
        let df = DataFrame::new(vec![
            col("a", vec![Value::Int(1)]),
            col("b", vec![Value::Str("x".into())]),
        ]);
        assert!(df.column("b").is_some());
        assert!(df.column("c").is_none());
        assert_eq!(df.column_names(), vec!["a", "b"]);
        assert_eq!(df.numeric_column_names(), vec!["a"]);
    }
}
