//! Kernel builders.
//!
//! Smoothing kernels are built from classic window functions. N-dimensional
//! kernels are separable: the weight at `(i, j, ..)` is the product of the
//! per-axis windows.
//!
//! Windows are symmetric with their peak at the center. Odd lengths keep
//! the peak on the kernel origin; even lengths put the two central weights
//! at offsets `-1` and `0`.

use lib_types::{Kernel, TypeResult};
use ndarray::{Array1, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function used as a kernel profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowType {
    /// Flat (boxcar) profile.
    Rectangular,

    /// Hann (raised cosine). Zero at both ends.
    Hann,

    /// Hamming. Non-zero ends, slightly narrower main lobe than Hann.
    Hamming,

    /// Blackman. Strong taper.
    Blackman,

    /// Kaiser-Bessel with shape parameter `beta`.
    Kaiser { beta: f64 },

    /// Gaussian with standard deviation `sigma` in samples.
    Gaussian { sigma: f64 },
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Rectangular
    }
}

/// Compute the zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Uses the polynomial approximation for efficiency.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();

    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t * (3.5156229
            + t * (3.0899424
                + t * (1.2067492
                    + t * (0.2659732
                        + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537
                                        + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

/// Generate window coefficients for a given window type and length.
///
/// # Arguments
///
/// * `window_type` - Profile to sample
/// * `length` - Number of points
///
/// # Returns
///
/// Vector of `length` coefficients, symmetric about the center.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let n = length as f64;
    let center = (n - 1.0) / 2.0;

    (0..length)
        .map(|i| {
            let x = i as f64 / (n - 1.0);
            match window_type {
                WindowType::Rectangular => 1.0,
                WindowType::Hann => 0.5 * (1.0 - (2.0 * PI * x).cos()),
                WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * x).cos(),
                WindowType::Blackman => {
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                }
                WindowType::Kaiser { beta } => {
                    let r = 2.0 * x - 1.0; // Range [-1, 1]
                    bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / bessel_i0(beta)
                }
                WindowType::Gaussian { sigma } => {
                    let d = i as f64 - center;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                }
            }
        })
        .collect()
}

/// Build a 1-D kernel from a window profile.
pub fn window_kernel(window_type: WindowType, length: usize) -> TypeResult<Kernel> {
    Kernel::new(Array1::from(generate_window(window_type, length)))
}

/// Build a separable N-D kernel with extent `shape[i]` on axis `i`.
pub fn separable_kernel(window_type: WindowType, shape: &[usize]) -> TypeResult<Kernel> {
    let windows: Vec<Vec<f64>> = shape
        .iter()
        .map(|&len| generate_window(window_type, len))
        .collect();

    let weights = ArrayD::from_shape_fn(IxDyn(shape), |index| {
        windows
            .iter()
            .enumerate()
            .map(|(axis, w)| w[index[axis]])
            .product::<f64>()
    });

    Kernel::new(weights)
}

/// All-ones kernel of the given shape (local moving average).
pub fn boxcar_kernel(shape: &[usize]) -> TypeResult<Kernel> {
    Kernel::new(ArrayD::<f64>::ones(IxDyn(shape)))
}
