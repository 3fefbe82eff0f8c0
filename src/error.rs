use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline error kinds
// ---------------------------------------------------------------------------

/// Errors that abort the analysis pipeline. Any of these terminates the run
/// immediately: no partial chart set, no partial report.
#[derive(Debug, Error)]
pub enum EdaError {
    /// The input file is missing, unreadable, or structurally malformed.
    #[error("failed to load dataset from '{path}': {reason}")]
    DataLoad { path: String, reason: String },

    /// A column the pipeline requires is absent from the table.
    #[error("{stage}: expected column '{column}' is missing from the dataset")]
    Schema { column: String, stage: &'static str },

    /// A statistic required for cleaning or rendering is undefined.
    #[error("insufficient data in column '{column}': {what}")]
    InsufficientData { column: String, what: String },
}

impl EdaError {
    pub fn schema(column: impl Into<String>, stage: &'static str) -> Self {
        EdaError::Schema {
            column: column.into(),
            stage,
        }
    }
}
