//! Common error types for the AHP engine and services

use thiserror::Error;

/// Common result type for AHP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the engine and the criteria analysis service
#[derive(Error, Debug)]
pub enum Error {
    /// A numeric row whose cell count is not n(n-1)/2 for any matrix order n
    #[error(
        "Invalid number of sub-criteria for engineer {respondent} (line {line}): \
         {cells} values do not form a valid matrix"
    )]
    MalformedInput {
        /// 1-based ordinal among numeric rows
        respondent: usize,
        /// 1-based line number in the uploaded text
        line: usize,
        /// Number of cells in the row
        cells: usize,
    },

    /// Eigen-decomposition or weight normalization hit a degenerate matrix
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Aggregation across matrices of differing order
    #[error("Matrix shape mismatch: expected {expected}x{expected}, found {found}x{found}")]
    MatrixShapeMismatch { expected: usize, found: usize },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for errors caused by the uploaded content rather than the engine
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::MalformedInput { .. } | Error::InvalidInput(_))
    }
}
