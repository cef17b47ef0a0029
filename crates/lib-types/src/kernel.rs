//! Convolution kernels.
//!
//! A kernel is an N-dimensional array of real weights. Its origin (the
//! element aligned with the output position) sits at `extent / 2` on every
//! axis, so odd kernels are centered and even kernels lean one element
//! towards the end of each axis:
//!
//! ```text
//! extent 3: offsets -1  0 +1    origin = 1
//! extent 4: offsets -2 -1  0 +1 origin = 2
//! ```
//!
//! Masked convolution renormalizes every output by the weights that were
//! actually used, so a kernel whose weights sum to zero (edge detectors,
//! derivative stencils) cannot be represented.

use crate::error::{TypeError, TypeResult};
use ndarray::{Array1, ArrayBase, ArrayD, ArrayViewD, Data, Dimension};

/// An N-dimensional kernel with a validated, non-zero weight sum.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    /// Kernel weights (dynamic rank).
    weights: ArrayD<f64>,

    /// Index of the element aligned with the output position.
    origin: Vec<usize>,

    /// Sum of all weights.
    sum: f64,
}

impl Kernel {
    /// Create a kernel from any weight array.
    ///
    /// Fails with [`TypeError::EmptyArray`] for rank 0 or an empty axis and
    /// with [`TypeError::InvalidKernel`] when the weights do not have a
    /// usable sum.
    pub fn new<S, D>(weights: ArrayBase<S, D>) -> TypeResult<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let weights = weights.into_owned().into_dyn();

        if weights.ndim() == 0 || weights.is_empty() {
            return Err(TypeError::EmptyArray {
                shape: weights.shape().to_vec(),
            });
        }

        let sum = weights.sum();
        let mass: f64 = weights.iter().map(|w| w.abs()).sum();

        // A sum within rounding of zero is as unusable as an exact zero.
        if !sum.is_finite() || sum.abs() <= f64::EPSILON * mass {
            return Err(TypeError::InvalidKernel { sum });
        }

        let origin = weights.shape().iter().map(|&n| n / 2).collect();

        Ok(Self {
            weights,
            origin,
            sum,
        })
    }

    /// Create a 1-D kernel from a list of weights.
    pub fn from_vec(weights: Vec<f64>) -> TypeResult<Self> {
        Self::new(Array1::from(weights))
    }

    /// View of the kernel weights.
    pub fn weights(&self) -> ArrayViewD<'_, f64> {
        self.weights.view()
    }

    /// Extent of the kernel on each axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.weights.shape()
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.weights.ndim()
    }

    /// Number of weights.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false: empty kernels are rejected on construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Origin index, `extent / 2` per axis.
    #[inline]
    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    /// Sum of all weights.
    #[inline]
    pub fn sum(&self) -> f64 {
        self.sum
    }
}
