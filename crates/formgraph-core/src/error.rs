//! Error types for formgraph

use thiserror::Error;

/// Result type alias using formgraph's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in formgraph operations
///
/// Graph-integrity problems (dangling connections, cycles, unknown kinds)
/// and numeric degeneracies are absorbed by the evaluator and never reach
/// this type; it covers genuine API misuse only.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Sampled field does not match the extractor's lattice
    #[error("Field size mismatch: expected {expected} samples, got {actual}")]
    FieldSizeMismatch { expected: usize, actual: usize },
}
