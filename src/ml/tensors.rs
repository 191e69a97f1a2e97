// ============================================================
// Layer 5 — Tensor Bridge (Burn)
// ============================================================
// Moves stored mini-batches onto a burn backend.
//
// Stored arrays carry their own element type (f32 or f64).
// `Tensor::from_data` converts them to the backend's float
// element, so one stored batch set feeds any float backend
// without rebuilding.
//
// Output tensors:
//   input   Tensor<B, 3>  [max_seq_len, batch_size, x_size]
//   mask    Tensor<B, 3>  [max_seq_len, batch_size, 1]
//   target  Frame → Tensor<B, 3>  [max_seq_len, batch_size, y_size]
//           Ctc   → Tensor<B, 2>  [batch_size, 2 * max_labels + 1]
//
// Reference: Burn Book §3 (Tensor), TensorData

use burn::prelude::*;
use burn::tensor::TensorData;

use crate::domain::{
    batch::{BatchSet, FloatArray, FloatValues, MiniBatch},
    error::{BatchError, Result},
};

/// Target tensor of a batch; the rank depends on the encoding.
#[derive(Debug, Clone)]
pub enum BatchTarget<B: Backend> {
    Frame(Tensor<B, 3>),
    Ctc(Tensor<B, 2>),
}

impl<B: Backend> BatchTarget<B> {
    pub fn dims(&self) -> Vec<usize> {
        match self {
            BatchTarget::Frame(t) => t.dims().to_vec(),
            BatchTarget::Ctc(t)   => t.dims().to_vec(),
        }
    }
}

/// A mini-batch living on a burn device.
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    pub input:  Tensor<B, 3>,
    pub target: BatchTarget<B>,
    pub mask:   Tensor<B, 3>,
}

impl<B: Backend> SequenceBatch<B> {
    pub fn from_batch(batch: &MiniBatch, device: &B::Device) -> Result<Self> {
        Self::from_arrays(&batch.input, &batch.target, &batch.mask, device)
    }

    fn from_arrays(
        input:  &FloatArray,
        target: &FloatArray,
        mask:   &FloatArray,
        device: &B::Device,
    ) -> Result<Self> {
        let input = tensor::<B, 3>(input, device)?;
        let mask  = tensor::<B, 3>(mask, device)?;

        let target = match target.shape().len() {
            3 => BatchTarget::Frame(tensor::<B, 3>(target, device)?),
            2 => BatchTarget::Ctc(tensor::<B, 2>(target, device)?),
            rank => {
                return Err(BatchError::DataCorruption(format!(
                    "target tensor has rank {rank}, expected 2 (CTC) or 3 (frame)"
                )))
            }
        };

        Ok(Self { input, target, mask })
    }
}

/// Convert a whole batch set, preserving batch order.
pub fn to_device<B: Backend>(set: &BatchSet, device: &B::Device) -> Result<Vec<SequenceBatch<B>>> {
    set.inputs
        .iter()
        .zip(&set.targets)
        .zip(&set.masks)
        .map(|((x, y), m)| SequenceBatch::from_arrays(x, y, m, device))
        .collect()
}

fn tensor<B: Backend, const D: usize>(array: &FloatArray, device: &B::Device) -> Result<Tensor<B, D>> {
    if array.shape().len() != D {
        return Err(BatchError::DataCorruption(format!(
            "expected a rank-{D} tensor, got shape {:?}",
            array.shape()
        )));
    }

    let shape = array.shape().to_vec();
    let data  = match array.values() {
        FloatValues::F32(v) => TensorData::new(v.clone(), shape),
        FloatValues::F64(v) => TensorData::new(v.clone(), shape),
    };
    Ok(Tensor::<B, D>::from_data(data, device))
}
