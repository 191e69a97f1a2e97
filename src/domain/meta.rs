// ============================================================
// Layer 3 — Split Metadata
// ============================================================
// Values derived by the validator for each split.
//
// The registry is the only shared mutable state in the run:
// the validator writes it, the builder reads it. It is passed
// explicitly instead of living in a global configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::split::Split;

/// Derived facts about one validated split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitMeta {
    /// Number of samples in the split
    pub set_len: usize,
    /// Feature width of every input timestep
    pub x_size: usize,
    /// Target width (frame mode) or label-space size (CTC mode)
    pub y_size: usize,
    /// floor(set_len / batch_size); the remainder is dropped
    pub batch_quantity: usize,
    pub checked: bool,
}

impl SplitMeta {
    /// Samples that do not fit into a full batch and are never batched.
    pub fn dropped_samples(&self, batch_size: usize) -> usize {
        self.set_len - self.batch_quantity * batch_size
    }
}

#[derive(Debug, Clone, Default)]
pub struct SplitRegistry {
    metas: BTreeMap<Split, SplitMeta>,
}

impl SplitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, split: Split, meta: SplitMeta) {
        self.metas.insert(split, meta);
    }

    pub fn get(&self, split: Split) -> Option<&SplitMeta> {
        self.metas.get(&split)
    }

    /// Metadata for a split only if it has been validated.
    pub fn checked(&self, split: Split) -> Option<SplitMeta> {
        self.metas.get(&split).filter(|m| m.checked).copied()
    }

    pub fn is_checked(&self, split: Split) -> bool {
        self.checked(split).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Split, &SplitMeta)> {
        self.metas.iter().map(|(s, m)| (*s, m))
    }
}
