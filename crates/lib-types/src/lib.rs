//! # lib-types
//!
//! Value types shared by the masked convolution workspace:
//! - [`MaskedArray`]: an N-dimensional sample array paired with a validity mask
//! - [`Kernel`]: a convolution footprint with a fixed origin and cached weight sum

pub mod error;
pub mod kernel;
pub mod masked;

pub use error::{TypeError, TypeResult};
pub use kernel::Kernel;
pub use masked::MaskedArray;

/// Re-export ndarray so callers build arrays against the same version.
pub use ndarray;
