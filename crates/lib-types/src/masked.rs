//! Masked sample arrays.
//!
//! A [`MaskedArray`] keeps invalid samples (cosmic-ray hits, dead pixels,
//! saturated columns) in place and flags them with a boolean mask of the
//! same shape. A `true` mask entry marks the sample as excluded.

use crate::error::{TypeError, TypeResult};
use ndarray::{Array, ArrayView, Dimension, Zip};

/// An N-dimensional `f64` array paired with a same-shaped validity mask.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedArray<D: Dimension> {
    data: Array<f64, D>,
    mask: Array<bool, D>,
}

impl<D: Dimension> MaskedArray<D> {
    /// Pair data with a mask, checking that both have the same shape.
    pub fn new(data: Array<f64, D>, mask: Array<bool, D>) -> TypeResult<Self> {
        if data.shape() != mask.shape() {
            return Err(TypeError::ShapeMismatch {
                expected: data.shape().to_vec(),
                actual: mask.shape().to_vec(),
            });
        }
        Ok(Self { data, mask })
    }

    /// Wrap data without any masked samples.
    pub fn from_data(data: Array<f64, D>) -> Self {
        let mask = Array::from_elem(data.raw_dim(), false);
        Self { data, mask }
    }

    /// Wrap data, masking every NaN or infinite sample.
    pub fn masked_invalid(data: Array<f64, D>) -> Self {
        let mask = data.mapv(|v| !v.is_finite());
        Self { data, mask }
    }

    /// Sample values, including the masked ones.
    pub fn data(&self) -> ArrayView<'_, f64, D> {
        self.data.view()
    }

    /// Validity mask (`true` = excluded).
    pub fn mask(&self) -> ArrayView<'_, bool, D> {
        self.mask.view()
    }

    /// Shape shared by data and mask.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Total number of samples, masked or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the array has no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of masked samples.
    pub fn count_masked(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    /// Number of unmasked samples.
    pub fn count_valid(&self) -> usize {
        self.len() - self.count_masked()
    }

    /// Mask additional samples.
    ///
    /// The new mask is the union of the current one and `extra`.
    pub fn mask_also(&mut self, extra: &ArrayView<'_, bool, D>) -> TypeResult<()> {
        if extra.shape() != self.mask.shape() {
            return Err(TypeError::ShapeMismatch {
                expected: self.mask.shape().to_vec(),
                actual: extra.shape().to_vec(),
            });
        }
        Zip::from(&mut self.mask).and(extra).for_each(|m, &e| *m |= e);
        Ok(())
    }

    /// Copy of the data with masked samples replaced by `fill`.
    pub fn filled(&self, fill: f64) -> Array<f64, D> {
        let mut out = self.data.clone();
        Zip::from(&mut out).and(&self.mask).for_each(|v, &m| {
            if m {
                *v = fill;
            }
        });
        out
    }

    /// Split into data and mask.
    pub fn into_parts(self) -> (Array<f64, D>, Array<bool, D>) {
        (self.data, self.mask)
    }
}
