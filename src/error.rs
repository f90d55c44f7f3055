//! Error types for neighbor search.

use thiserror::Error;

/// Errors surfaced by index construction and the search entry points.
///
/// All of them are raised during validation, before any index is built.
/// A query without neighbors is never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NeighborError {
    /// Point or array length does not agree with the configured dimensionality.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Malformed batch boundaries (non-monotonic, wrong length, mismatched cloud counts).
    #[error("invalid batch layout: {0}")]
    InvalidBatchLayout(String),

    /// Negative radius, negative k, unsupported mode value and similar.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Output buffer could not be sized.
    #[error("allocation failure: could not reserve {requested} output entries")]
    AllocationFailure { requested: usize },
}

/// Result type for neighbor search operations.
pub type Result<T> = std::result::Result<T, NeighborError>;
