//! # lib-convolve
//!
//! Mask-aware convolution for astronomical spectra and images.
//!
//! - **Masked convolution**: weighted means over valid, in-bounds neighbors
//!   with per-position renormalization, for arrays of any rank
//! - **Mask interpolation**: fill masked samples from their neighbors
//! - **Kernel builders**: boxcar, window and Gaussian profiles, separable in N-D
//! - **Configuration**: serde/JSON options for exclusion, strictness and threading

pub mod config;
pub mod convolution;
pub mod error;
pub mod kernels;

#[cfg(test)]
mod synthetic;

pub use config::{Boundary, ConvolveConfig, EmptyNeighborhood, Execution};
pub use convolution::{convolve, interpolate_mask, naive_convolve, MaskedConvolver};
pub use error::{ConvolveError, ConvolveResult};
pub use kernels::{boxcar_kernel, separable_kernel, window_kernel, WindowType};
pub use lib_types::{Kernel, MaskedArray};
