use thiserror::Error;

/// Errors returned by hclust operations.
#[derive(Debug, Error)]
pub enum HclustError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A matrix cell `m[row][col]` is NaN.
    #[error("distance is NaN at ({row}, {col})")]
    NotANumber { row: usize, col: usize },

    /// The linkage between live clusters at positions `left` and `right` is NaN.
    #[error("linkage is NaN between live clusters {left} and {right}")]
    LinkageNotANumber { left: usize, right: usize },

    #[error("matrix is not square: {rows} rows, row {row} has {len} columns")]
    NotSquare { rows: usize, row: usize, len: usize },

    #[error("record {index}: missing field {key:?}")]
    MissingField { index: usize, key: String },

    #[error("record {index}: expected an array of numbers")]
    NotNumeric { index: usize },

    #[error("unknown {kind} {name:?}")]
    UnknownName { kind: &'static str, name: String },

    #[error("metric error: {0}")]
    Metric(String),

    #[error("clustering cancelled")]
    Cancelled,
}

/// Result alias for hclust operations.
pub type Result<T> = std::result::Result<T, HclustError>;
