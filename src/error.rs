//! Error types.
//!
//! - `AppError` is the process-boundary error: a human-readable message plus the
//!   exit code the `risk` binary terminates with.
//! - `ScoreError` is the scoring transform's own taxonomy. It is converted into
//!   an `AppError` at the request boundary (CLI command, TUI action).

use std::fmt;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of a single scoring request (one row or one batch).
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// The selected model variant is not present in the package.
    ModelUnavailable { model: &'static str },
    /// A categorical value was not seen by the column's encoder at training time.
    UnknownCategory { column: String, value: String },
    /// A numeric feature column carried a value that is not a finite number.
    NonNumeric { column: String, value: String },
    /// The row (or table) does not fit the package's feature schema.
    SchemaMismatch(String),
    /// The assembled matrix does not have the width the fitted components expect.
    ShapeMismatch { expected: usize, actual: usize },
    /// Decision threshold outside `[0, 1]`.
    InvalidThreshold(f64),
    /// Applicant field outside its accepted range.
    InvalidInput(String),
}

impl ScoreError {
    /// Whether the error only concerns one row of a batch.
    ///
    /// Row-scoped errors leave the rest of the batch intact; everything else
    /// aborts the whole batch.
    pub fn is_row_scoped(&self) -> bool {
        matches!(self, ScoreError::UnknownCategory { .. } | ScoreError::InvalidInput(_))
    }
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::ModelUnavailable { model } => {
                write!(f, "Model unavailable: the package does not contain a {model}.")
            }
            ScoreError::UnknownCategory { column, value } => {
                write!(f, "Unknown category '{value}' for `{column}` (not seen during training).")
            }
            ScoreError::NonNumeric { column, value } => {
                write!(f, "Non-numeric value '{value}' in numeric column `{column}`.")
            }
            ScoreError::SchemaMismatch(msg) => write!(f, "Schema mismatch: {msg}"),
            ScoreError::ShapeMismatch { expected, actual } => {
                write!(f, "Shape mismatch: expected {expected} feature columns, got {actual}.")
            }
            ScoreError::InvalidThreshold(t) => {
                write!(f, "Invalid decision threshold {t} (must be within [0, 1]).")
            }
            ScoreError::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
        }
    }
}

impl std::error::Error for ScoreError {}

impl From<ScoreError> for AppError {
    fn from(err: ScoreError) -> Self {
        AppError::new(2, format!("Prediction error: {err}"))
    }
}
