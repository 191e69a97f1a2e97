// ============================================================
// Layer 3 — Dataset Split
// ============================================================
// The three dataset partitions and the sample-order strategy
// attached to each of them.
//
// Only the training split is shuffled. Validation and test
// batches keep the on-disk sample order so that evaluation
// runs are comparable across epochs and across builds.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::error::BatchError;

/// One of the three dataset partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
    Test,
}

impl Split {
    /// All splits in processing order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Valid, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
            Split::Test  => "test",
        }
    }

    /// How samples of this split are ordered before slicing into batches.
    pub fn sample_order(&self) -> SampleOrder {
        match self {
            Split::Train                => SampleOrder::Shuffled,
            Split::Valid | Split::Test  => SampleOrder::Identity,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Split {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(Split::Train),
            "valid" => Ok(Split::Valid),
            "test"  => Ok(Split::Test),
            other   => Err(BatchError::InvalidArgument(format!(
                "split must be 'train', 'valid' or 'test', got '{other}'"
            ))),
        }
    }
}

/// Sample ordering strategy used by the batch builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOrder {
    /// Keep samples in storage order: 0, 1, 2, ...
    Identity,
    /// Draw a fresh uniform permutation on every build.
    Shuffled,
}
