// ============================================================
// Layer 3 — Padded Arrays, Mini-Batches and Batch Sets
// ============================================================
// Plain n-dimensional arrays in row-major order, plus the
// structs that group them into mini-batches.
//
// Arrays are built in f64 (`PaddedArray`) and cast once to the
// configured float precision (`FloatArray`) when a batch is
// finished. Only the cast arrays are persisted.
//
// Layouts (T = max_seq_len, B = batch_size):
//   input   [T, B, x_size]
//   target  [T, B, y_size]          frame mode
//           [B, 2 * max_labels + 1] CTC mode
//   mask    [T, B, 1]
//
// Reference: Rust Book §8 (Vectors)
//            serde documentation (adjacently tagged enums)

use serde::{Deserialize, Serialize};

use crate::domain::error::{BatchError, Result};

// ─── FloatPrecision ───────────────────────────────────────────────────────────
/// Element type of finished batch tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatPrecision {
    #[default]
    F32,
    F64,
}

// ─── PaddedArray ──────────────────────────────────────────────────────────────
/// Zero-initialised working buffer used while a batch is assembled.
/// Every cell that is never written stays 0.0, which is the padding.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedArray {
    shape: Vec<usize>,
    data:  Vec<f64>,
}

impl PaddedArray {
    pub fn zeros(shape: &[usize]) -> Self {
        let len = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            data:  vec![0.0; len],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Mutable view of the innermost row addressed by `prefix`.
    /// `prefix` must index every dimension except the last one.
    pub fn row_mut(&mut self, prefix: &[usize]) -> &mut [f64] {
        debug_assert_eq!(prefix.len() + 1, self.shape.len());
        let width = self.shape[self.shape.len() - 1];
        let start = offset(&self.shape, prefix) * width;
        &mut self.data[start..start + width]
    }

    /// Cast to the finished element type.
    pub fn cast(self, precision: FloatPrecision) -> FloatArray {
        let values = match precision {
            FloatPrecision::F32 => FloatValues::F32(self.data.iter().map(|&v| v as f32).collect()),
            FloatPrecision::F64 => FloatValues::F64(self.data),
        };
        FloatArray { shape: self.shape, values }
    }
}

/// Row-major offset of a (possibly partial) index, in units of the
/// dimensions that follow it.
fn offset(shape: &[usize], index: &[usize]) -> usize {
    index
        .iter()
        .zip(shape)
        .fold(0, |acc, (&i, &dim)| {
            debug_assert!(i < dim, "index {i} out of bounds for dimension {dim}");
            acc * dim + i
        })
}

// ─── FloatArray ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dtype", content = "data", rename_all = "lowercase")]
pub enum FloatValues {
    F32(Vec<f32>),
    F64(Vec<f64>),
}

/// A finished, cast tensor as it is stored in a batch set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatArray {
    shape:  Vec<usize>,
    values: FloatValues,
}

impl FloatArray {
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn values(&self) -> &FloatValues {
        &self.values
    }

    pub fn precision(&self) -> FloatPrecision {
        match self.values {
            FloatValues::F32(_) => FloatPrecision::F32,
            FloatValues::F64(_) => FloatPrecision::F64,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match &self.values {
            FloatValues::F32(v) => v.len(),
            FloatValues::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a full index, widened to f64.
    pub fn get(&self, index: &[usize]) -> f64 {
        debug_assert_eq!(index.len(), self.shape.len());
        let i = offset(&self.shape, index);
        match &self.values {
            FloatValues::F32(v) => f64::from(v[i]),
            FloatValues::F64(v) => v[i],
        }
    }

    /// All elements widened to f64, in row-major order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match &self.values {
            FloatValues::F32(v) => v.iter().map(|&x| f64::from(x)).collect(),
            FloatValues::F64(v) => v.clone(),
        }
    }

    /// Sum of all elements. For a mask this is the number of active timesteps.
    pub fn sum(&self) -> f64 {
        match &self.values {
            FloatValues::F32(v) => v.iter().map(|&x| f64::from(x)).sum(),
            FloatValues::F64(v) => v.iter().sum(),
        }
    }

    /// Full index of the first NaN or infinite element, if any.
    pub fn first_non_finite(&self) -> Option<Vec<usize>> {
        let flat = match &self.values {
            FloatValues::F32(v) => v.iter().position(|x| !x.is_finite()),
            FloatValues::F64(v) => v.iter().position(|x| !x.is_finite()),
        }?;

        let mut index = vec![0; self.shape.len()];
        let mut rest  = flat;
        for (slot, &dim) in index.iter_mut().zip(&self.shape).rev() {
            *slot = rest % dim;
            rest /= dim;
        }
        Some(index)
    }

    /// True when the element count matches the declared shape.
    pub fn is_well_formed(&self) -> bool {
        self.shape.iter().product::<usize>() == self.len()
    }
}

// ─── MiniBatch ────────────────────────────────────────────────────────────────
/// One padded group of `batch_size` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniBatch {
    pub input:  FloatArray,
    pub target: FloatArray,
    pub mask:   FloatArray,
}

impl MiniBatch {
    /// Padded sequence length shared by every sample in the batch.
    pub fn max_seq_len(&self) -> usize {
        self.input.shape()[0]
    }

    pub fn batch_size(&self) -> usize {
        self.input.shape()[1]
    }

    /// Timesteps that carry real data, summed over all slots.
    pub fn active_timesteps(&self) -> usize {
        self.mask.sum() as usize
    }

    /// Timesteps that are padding, summed over all slots.
    pub fn padded_timesteps(&self) -> usize {
        self.max_seq_len() * self.batch_size() - self.active_timesteps()
    }
}

// ─── BatchSet ─────────────────────────────────────────────────────────────────
/// All mini-batches of one split, kept as three parallel sequences
/// in the same shape they are persisted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSet {
    pub inputs:  Vec<FloatArray>,
    pub targets: Vec<FloatArray>,
    pub masks:   Vec<FloatArray>,
}

impl BatchSet {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            inputs:  Vec::with_capacity(n),
            targets: Vec::with_capacity(n),
            masks:   Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, batch: MiniBatch) {
        self.inputs.push(batch.input);
        self.targets.push(batch.target);
        self.masks.push(batch.mask);
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Reassemble a batch set from stored sequences, rejecting
    /// anything that could not have been produced by the builder.
    pub fn from_parts(
        inputs:  Vec<FloatArray>,
        targets: Vec<FloatArray>,
        masks:   Vec<FloatArray>,
    ) -> Result<Self> {
        if inputs.len() != targets.len() || inputs.len() != masks.len() {
            return Err(BatchError::DataCorruption(format!(
                "batch sequences have different lengths: x={}, y={}, m={}",
                inputs.len(),
                targets.len(),
                masks.len()
            )));
        }

        let malformed = inputs
            .iter()
            .chain(&targets)
            .chain(&masks)
            .any(|a| !a.is_well_formed());
        if malformed {
            return Err(BatchError::DataCorruption(
                "stored tensor has an element count that does not match its shape".into(),
            ));
        }

        let bad_layout = inputs.iter().zip(&masks).any(|(x, m)| {
            x.shape().len() != 3 || m.shape().len() != 3 || x.shape()[..2] != m.shape()[..2]
        });
        if bad_layout {
            return Err(BatchError::DataCorruption(
                "input and mask tensors do not share a [time, batch] layout".into(),
            ));
        }

        Ok(Self { inputs, targets, masks })
    }

    /// Split back into per-batch records, in build order.
    pub fn into_batches(self) -> Vec<MiniBatch> {
        self.inputs
            .into_iter()
            .zip(self.targets)
            .zip(self.masks)
            .map(|((input, target), mask)| MiniBatch { input, target, mask })
            .collect()
    }
}
