// ============================================================
// Layer 3 — Raw Split Samples
// ============================================================
// The unbatched data of one split as it comes out of storage.
//
//   x: one sequence per sample, each [length_i × x_size]
//   y: frame mode → one sequence per sample, [length_i × y_size]
//      CTC mode   → one label index sequence per sample,
//                   of any length
//
// Sequences are nested Vecs rather than a flat buffer because
// every sample has its own length. Padding only happens when
// samples are grouped into a batch.

use serde::{Deserialize, Serialize};

/// One variable-length sequence of feature vectors.
pub type Sequence = Vec<Vec<f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawTargets {
    /// Framewise target vectors (regression or classification losses)
    Frames(Vec<Sequence>),
    /// Label index sequences (CTC loss)
    Labels(Vec<Vec<usize>>),
}

impl RawTargets {
    pub fn len(&self) -> usize {
        match self {
            RawTargets::Frames(v) => v.len(),
            RawTargets::Labels(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-sample target length: timesteps for frames, labels for CTC.
    pub fn lengths(&self) -> Vec<usize> {
        match self {
            RawTargets::Frames(v) => v.iter().map(Vec::len).collect(),
            RawTargets::Labels(v) => v.iter().map(Vec::len).collect(),
        }
    }
}

/// Raw inputs and targets of a single split.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSplit {
    pub x: Vec<Sequence>,
    pub y: RawTargets,
}

impl RawSplit {
    pub fn new(x: Vec<Sequence>, y: RawTargets) -> Self {
        Self { x, y }
    }

    /// Number of input samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Per-sample input length table.
    pub fn x_lengths(&self) -> Vec<usize> {
        self.x.iter().map(Vec::len).collect()
    }

    /// Per-sample target length table, computed independently of x.
    pub fn y_lengths(&self) -> Vec<usize> {
        self.y.lengths()
    }

    /// Feature width of the first sample, if it has at least one timestep.
    pub fn x_width(&self) -> Option<usize> {
        self.x.first()?.first().map(Vec::len)
    }

    /// Target width of the first sample. Only defined for framewise targets.
    pub fn y_width(&self) -> Option<usize> {
        match &self.y {
            RawTargets::Frames(v) => v.first()?.first().map(Vec::len),
            RawTargets::Labels(_) => None,
        }
    }
}
