//! Error types for array and kernel construction.

use thiserror::Error;

/// Errors that can occur while building masked arrays or kernels.
#[derive(Debug, Error)]
pub enum TypeError {
    /// Kernel weights sum to zero (or are not finite), so the
    /// per-element normalization is undefined.
    #[error("Kernel weights must have a non-zero finite sum, got {sum}")]
    InvalidKernel { sum: f64 },

    /// Two arrays that must share a shape do not.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Array has rank 0 or an axis of extent 0.
    #[error("Array must have rank >= 1 and non-empty axes, got shape {shape:?}")]
    EmptyArray { shape: Vec<usize> },
}

/// Result type for type construction.
pub type TypeResult<T> = Result<T, TypeError>;
