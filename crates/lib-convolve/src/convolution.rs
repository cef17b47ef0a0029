//! Mask-aware N-dimensional convolution.
//!
//! Every output element is the weighted mean of the valid samples under the
//! kernel footprint:
//!
//! ```text
//! result[p] = Σ data[q]·w[k] / Σ w[k]     over k with q = p + k - origin valid
//! ```
//!
//! A sample `q` is invalid when it lies outside the array, when it is
//! masked, or (with `exclude_non_finite`) when it is NaN/±Inf. Invalid
//! samples drop out of the numerator *and* the denominator, so edges and
//! masked regions are renormalized instead of being dragged towards zero
//! the way plain zero-padded convolution would.
//!
//! The cost is O(N·K) for N samples and K kernel weights. That is fine for
//! spectra and CCD-sized images; FFT methods win for very large kernels but
//! cannot skip arbitrary samples.

use crate::config::{ConvolveConfig, EmptyNeighborhood, Execution};
use crate::error::{ConvolveError, ConvolveResult};
use lib_types::{Kernel, MaskedArray};
use ndarray::{Array, ArrayD, ArrayView, Dimension};
use rayon::prelude::*;

/// Work (`positions * kernel_len`) above which `Execution::Auto` uses rayon.
pub const PARALLEL_WORK_THRESHOLD: usize = 1 << 16;

/// Masked convolution engine for a fixed kernel.
///
/// Kernel offsets are computed once, so one engine can be reused across
/// many arrays of the same rank.
#[derive(Clone, Debug)]
pub struct MaskedConvolver {
    kernel: Kernel,

    /// Per-tap offset from the origin, `ndim` entries per tap.
    offsets: Vec<isize>,

    /// Per-tap weight, in the same order as `offsets`.
    taps: Vec<f64>,

    config: ConvolveConfig,
}

/// Flattened, row-major copy of the inputs for one call.
struct Grid<'a> {
    shape: &'a [usize],
    strides: Vec<usize>,
    values: Vec<f64>,
    excluded: Vec<bool>,
}

impl Grid<'_> {
    #[inline]
    fn unravel(&self, flat: usize, pos: &mut [usize]) {
        for ((p, &stride), &extent) in pos.iter_mut().zip(&self.strides).zip(self.shape) {
            *p = (flat / stride) % extent;
        }
    }
}

impl MaskedConvolver {
    /// Create an engine for `kernel` with the given options.
    pub fn new(kernel: Kernel, config: ConvolveConfig) -> Self {
        let ndim = kernel.ndim();
        let origin = kernel.origin().to_vec();

        let mut offsets = Vec::with_capacity(kernel.len() * ndim);
        let mut taps = Vec::with_capacity(kernel.len());
        for (index, &weight) in kernel.weights().indexed_iter() {
            for (axis, &o) in origin.iter().enumerate() {
                offsets.push(index[axis] as isize - o as isize);
            }
            taps.push(weight);
        }

        tracing::debug!(
            "MaskedConvolver: kernel shape={:?}, origin={:?}, sum={}, boundary={:?}, execution={:?}",
            kernel.shape(),
            origin,
            kernel.sum(),
            config.boundary,
            config.execution
        );

        Self {
            kernel,
            offsets,
            taps,
            config,
        }
    }

    /// Create an engine with default options.
    pub fn with_kernel(kernel: Kernel) -> Self {
        Self::new(kernel, ConvolveConfig::default())
    }

    /// The kernel in use.
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The options in use.
    pub fn config(&self) -> &ConvolveConfig {
        &self.config
    }

    /// Convolve `data`, skipping masked and out-of-bounds samples.
    ///
    /// Positions whose whole neighborhood is excluded become NaN, or fail
    /// the call under `EmptyNeighborhood::Error`.
    pub fn convolve<D: Dimension>(
        &self,
        data: &ArrayView<'_, f64, D>,
        mask: Option<&ArrayView<'_, bool, D>>,
    ) -> ConvolveResult<Array<f64, D>> {
        let grid = self.prepare(data, mask)?;
        let mut results = self.evaluate(&grid, false);

        if self.config.rescale_kernel {
            let scale = self.kernel.sum();
            for v in results.iter_mut().flatten() {
                *v *= scale;
            }
        }

        let values = self.resolve_empty(&grid, results)?;
        Ok(Array::from_shape_vec(data.raw_dim(), values)?)
    }

    /// Convolve a [`MaskedArray`] using its own mask.
    pub fn convolve_masked<D: Dimension>(
        &self,
        array: &MaskedArray<D>,
    ) -> ConvolveResult<Array<f64, D>> {
        self.convolve(&array.data(), Some(&array.mask()))
    }

    /// Replace excluded samples by the masked convolution of their
    /// neighbors and copy every other sample unchanged.
    ///
    /// `rescale_kernel` is ignored here: fill values are always weighted
    /// means so they stay on the scale of the data.
    pub fn interpolate<D: Dimension>(
        &self,
        data: &ArrayView<'_, f64, D>,
        mask: Option<&ArrayView<'_, bool, D>>,
    ) -> ConvolveResult<Array<f64, D>> {
        let grid = self.prepare(data, mask)?;
        let results = self.evaluate(&grid, true);
        let values = self.resolve_empty(&grid, results)?;
        Ok(Array::from_shape_vec(data.raw_dim(), values)?)
    }

    /// Interpolate the masked samples of a [`MaskedArray`].
    pub fn interpolate_masked<D: Dimension>(
        &self,
        array: &MaskedArray<D>,
    ) -> ConvolveResult<Array<f64, D>> {
        self.interpolate(&array.data(), Some(&array.mask()))
    }

    /// Validate the inputs and flatten them into a row-major grid.
    fn prepare<'a, D: Dimension>(
        &self,
        data: &'a ArrayView<'_, f64, D>,
        mask: Option<&ArrayView<'_, bool, D>>,
    ) -> ConvolveResult<Grid<'a>> {
        let shape = data.shape();

        if shape.is_empty() || data.is_empty() {
            return Err(ConvolveError::EmptyArray {
                shape: shape.to_vec(),
            });
        }
        if self.kernel.ndim() != shape.len() {
            return Err(ConvolveError::RankMismatch {
                expected: shape.len(),
                actual: self.kernel.ndim(),
            });
        }

        let values: Vec<f64> = data.iter().copied().collect();

        let mut excluded: Vec<bool> = match mask {
            Some(mask) => {
                if mask.shape() != shape {
                    return Err(ConvolveError::ShapeMismatch {
                        expected: shape.to_vec(),
                        actual: mask.shape().to_vec(),
                    });
                }
                mask.iter().copied().collect()
            }
            None => vec![false; values.len()],
        };

        if self.config.exclude_non_finite {
            for (ex, v) in excluded.iter_mut().zip(&values) {
                *ex |= !v.is_finite();
            }
        }

        let mut strides = vec![1usize; shape.len()];
        for axis in (0..shape.len() - 1).rev() {
            strides[axis] = strides[axis + 1] * shape[axis + 1];
        }

        Ok(Grid {
            shape,
            strides,
            values,
            excluded,
        })
    }

    /// Evaluate every position. With `only_excluded`, valid positions are
    /// copied through instead of convolved.
    fn evaluate(&self, grid: &Grid<'_>, only_excluded: bool) -> Vec<Option<f64>> {
        let len = grid.values.len();
        let ndim = grid.shape.len();

        let at = |pos: &mut Vec<usize>, flat: usize| {
            if only_excluded && !grid.excluded[flat] {
                Some(grid.values[flat])
            } else {
                self.neighborhood_mean(grid, pos, flat)
            }
        };

        if self.run_parallel(len) {
            (0..len)
                .into_par_iter()
                .map_init(|| vec![0usize; ndim], at)
                .collect()
        } else {
            let mut pos = vec![0usize; ndim];
            (0..len).map(|flat| at(&mut pos, flat)).collect()
        }
    }

    fn run_parallel(&self, positions: usize) -> bool {
        match self.config.execution {
            Execution::Sequential => false,
            Execution::Parallel => true,
            Execution::Auto => positions.saturating_mul(self.taps.len()) >= PARALLEL_WORK_THRESHOLD,
        }
    }

    /// Weighted mean of the valid samples around `flat`, or `None` when
    /// the used weights sum to zero.
    #[inline]
    fn neighborhood_mean(&self, grid: &Grid<'_>, pos: &mut [usize], flat: usize) -> Option<f64> {
        grid.unravel(flat, pos);
        let ndim = pos.len();

        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        'taps: for (offsets, &weight) in self.offsets.chunks_exact(ndim).zip(&self.taps) {
            let mut q = 0usize;
            for axis in 0..ndim {
                let c = pos[axis] as isize + offsets[axis];
                if c < 0 || c as usize >= grid.shape[axis] {
                    continue 'taps;
                }
                q += c as usize * grid.strides[axis];
            }
            if grid.excluded[q] {
                continue;
            }
            weighted_sum += grid.values[q] * weight;
            weight_total += weight;
        }

        if weight_total != 0.0 {
            Some(weighted_sum / weight_total)
        } else {
            None
        }
    }

    /// Apply the empty-neighborhood policy.
    fn resolve_empty(&self, grid: &Grid<'_>, results: Vec<Option<f64>>) -> ConvolveResult<Vec<f64>> {
        let empty = results.iter().filter(|r| r.is_none()).count();
        if empty == 0 {
            return Ok(results.into_iter().flatten().collect());
        }

        match self.config.empty_neighborhood {
            EmptyNeighborhood::Error => {
                let flat = results.iter().position(Option::is_none).unwrap_or_default();
                let mut index = vec![0usize; grid.shape.len()];
                grid.unravel(flat, &mut index);
                Err(ConvolveError::EmptyNeighborhood { index })
            }
            EmptyNeighborhood::Nan => {
                tracing::warn!(
                    "{} of {} positions have no valid neighbors, set to NaN",
                    empty,
                    results.len()
                );
                Ok(results.into_iter().map(|r| r.unwrap_or(f64::NAN)).collect())
            }
        }
    }
}

/// Convolve `data` with raw kernel weights.
///
/// Builds the [`Kernel`] (rejecting zero-sum weights) and runs a
/// [`MaskedConvolver`] once.
pub fn convolve<D: Dimension>(
    data: &ArrayView<'_, f64, D>,
    kernel: &ArrayView<'_, f64, D>,
    mask: Option<&ArrayView<'_, bool, D>>,
    config: &ConvolveConfig,
) -> ConvolveResult<Array<f64, D>> {
    let kernel = Kernel::new(kernel.view())?;
    MaskedConvolver::new(kernel, config.clone()).convolve(data, mask)
}

/// Fill the excluded samples of `data` from their valid neighbors.
pub fn interpolate_mask<D: Dimension>(
    data: &ArrayView<'_, f64, D>,
    kernel: &ArrayView<'_, f64, D>,
    mask: Option<&ArrayView<'_, bool, D>>,
    config: &ConvolveConfig,
) -> ConvolveResult<Array<f64, D>> {
    let kernel = Kernel::new(kernel.view())?;
    MaskedConvolver::new(kernel, config.clone()).interpolate(data, mask)
}

/// Plain zero-padded correlation with the same output shape.
///
/// Nothing is excluded or renormalized. Away from edges this equals the
/// unmasked result of [`MaskedConvolver`] with `rescale_kernel`.
/// Only meant for comparisons.
pub fn naive_convolve<D: Dimension>(
    data: &ArrayView<'_, f64, D>,
    kernel: &Kernel,
) -> ConvolveResult<Array<f64, D>> {
    if kernel.ndim() != data.ndim() {
        return Err(ConvolveError::RankMismatch {
            expected: data.ndim(),
            actual: kernel.ndim(),
        });
    }

    let data = data.view().into_dyn();
    let weights = kernel.weights();
    let origin = kernel.origin();
    let mut q = vec![0usize; data.ndim()];

    let mut out = ArrayD::<f64>::zeros(data.raw_dim());
    for (p, o) in out.indexed_iter_mut() {
        let mut sum = 0.0;
        'taps: for (k, &w) in weights.indexed_iter() {
            for axis in 0..q.len() {
                let c = p[axis] as isize + k[axis] as isize - origin[axis] as isize;
                if c < 0 || c as usize >= data.shape()[axis] {
                    continue 'taps;
                }
                q[axis] = c as usize;
            }
            sum += data[q.as_slice()] * w;
        }
        *o = sum;
    }

    Ok(out.into_dimensionality::<D>()?)
}
