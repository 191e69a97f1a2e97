// ============================================================
// Layer 3 — Target Encoding
// ============================================================
// The two incompatible target layouts a batch can carry:
//
//   Frame  → one target vector per timestep, same length as x
//            target tensor: [max_seq_len, batch_size, y_size]
//
//   Ctc    → a label index sequence of independent length,
//            interleaved with a blank symbol
//            target tensor: [batch_size, 2 * max_label_len + 1]
//
// The encoding is chosen once from the configured loss
// function. The builder only branches on it where tensors are
// allocated and where a sample's target is written.
//
// CTC encoding with blank = 4:
//   labels  [1, 2]
//   encoded [4, 1, 4, 2, 4]
//
// Reference: Graves et al. (2006) Connectionist Temporal Classification

use serde::{Deserialize, Serialize};

use crate::domain::error::{BatchError, Result};

/// Loss function the network will be trained with.
/// Only `Ctc` changes how targets are batched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFunction {
    Mse,
    CrossEntropy,
    Ctc,
}

impl Default for LossFunction {
    fn default() -> Self {
        LossFunction::Mse
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEncoding {
    /// Framewise targets aligned with the input sequence.
    Frame,
    /// CTC label sequences; `blank` is the reserved separator index.
    Ctc { blank: usize },
}

impl TargetEncoding {
    /// Select the encoding for a loss function and network output width.
    /// In CTC mode the blank symbol is the last output unit.
    pub fn from_loss(loss: LossFunction, output_width: usize) -> Result<Self> {
        match loss {
            LossFunction::Ctc => {
                let blank = output_width.checked_sub(1).ok_or_else(|| {
                    BatchError::Config("CTC needs a network output width of at least 1".into())
                })?;
                Ok(TargetEncoding::Ctc { blank })
            }
            LossFunction::Mse | LossFunction::CrossEntropy => Ok(TargetEncoding::Frame),
        }
    }

    pub fn is_ctc(&self) -> bool {
        matches!(self, TargetEncoding::Ctc { .. })
    }
}

/// Encode a label sequence as `[blank, l1, blank, l2, ..., lm, blank]`.
///
/// The result always has length `2 * labels.len() + 1`.
/// Labels must lie strictly below the blank index.
pub fn encode_ctc_labels(labels: &[usize], blank: usize) -> Result<Vec<usize>> {
    let mut encoded = Vec::with_capacity(2 * labels.len() + 1);
    encoded.push(blank);

    for &label in labels {
        if label >= blank {
            return Err(BatchError::inconsistent(format!(
                "CTC label {label} is outside the label space [0, {blank})"
            )));
        }
        encoded.push(label);
        encoded.push(blank);
    }

    Ok(encoded)
}
