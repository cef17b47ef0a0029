//! Error types for masked convolution.

use lib_types::TypeError;
use thiserror::Error;

/// Errors that can occur during masked convolution.
#[derive(Debug, Error)]
pub enum ConvolveError {
    /// Kernel weights sum to zero or are not finite.
    #[error("Invalid kernel: weights must have a non-zero finite sum, got {sum}")]
    InvalidKernel { sum: f64 },

    /// Mask shape differs from the data shape.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Kernel rank differs from the data rank.
    #[error("Rank mismatch: data has {expected} axes, kernel has {actual}")]
    RankMismatch { expected: usize, actual: usize },

    /// Input has rank 0 or an empty axis.
    #[error("Empty array: shape {shape:?}")]
    EmptyArray { shape: Vec<usize> },

    /// Every neighbor of an output position was excluded (strict mode).
    #[error("No valid samples in the neighborhood of index {index:?}")]
    EmptyNeighborhood { index: Vec<usize> },

    /// I/O error reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration.
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Output could not be laid out in the input's shape.
    #[error("Layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

impl From<TypeError> for ConvolveError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidKernel { sum } => ConvolveError::InvalidKernel { sum },
            TypeError::ShapeMismatch { expected, actual } => {
                ConvolveError::ShapeMismatch { expected, actual }
            }
            TypeError::EmptyArray { shape } => ConvolveError::EmptyArray { shape },
        }
    }
}

/// Result type for convolution operations.
pub type ConvolveResult<T> = Result<T, ConvolveError>;
