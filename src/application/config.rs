// ============================================================
// Layer 2 — Data Configuration
// ============================================================
// Every setting the validator, builder and store read.
// Serialisable so a run can be described by one JSON file and
// the effective settings can be saved next to the batch sets.
//
// Example data.json:
//   {
//     "train_data_name":     "timit_train",
//     "valid_data_name":     "timit_valid",
//     "test_data_name":      null,
//     "data_location":       "data/raw",
//     "mini_batch_location": "data/mini_batches",
//     "batch_size":          16,
//     "net_size":            [39, 120, 62],
//     "loss_function":       "ctc",
//     "precision":           "f32",
//     "seed":                1234
//   }
//
// Storage keys:
//   raw data   → {data_location}/{<split>_data_name}
//   batch set  → {mini_batch_location}/mb_of_{<split>_data_name}
//
// Reference: Rust Book §9 (Error Handling)
//            serde documentation (derive, default)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::{
    batch::FloatPrecision,
    encoding::{LossFunction, TargetEncoding},
    error::BatchError,
    split::Split,
};

/// Filename prefix of stored batch sets.
pub const MINI_BATCH_PREFIX: &str = "mb_of_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub train_data_name:     Option<String>,
    pub valid_data_name:     Option<String>,
    pub test_data_name:      Option<String>,
    pub data_location:       PathBuf,
    pub mini_batch_location: PathBuf,
    pub batch_size:          usize,
    /// Layer widths of the network; first = input width, last = output width
    pub net_size:            Vec<usize>,
    pub loss_function:       LossFunction,
    pub precision:           FloatPrecision,
    /// Seed for the training-split permutation; None draws from entropy
    pub seed:                Option<u64>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_data_name:     None,
            valid_data_name:     None,
            test_data_name:      None,
            data_location:       PathBuf::from("data"),
            mini_batch_location: PathBuf::from("mini_batches"),
            batch_size:          8,
            net_size:            Vec::new(),
            loss_function:       LossFunction::default(),
            precision:           FloatPrecision::default(),
            seed:                None,
        }
    }
}

impl DataConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        let cfg: Self = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config JSON in '{}'", path.display()))?;
        Ok(cfg)
    }

    /// Write the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved data config to '{}'", path.display());
        Ok(())
    }

    /// Reject settings no split could ever be batched with.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::Config("batch_size must be at least 1".into()));
        }
        if self.net_size.len() < 2 {
            return Err(BatchError::Config(format!(
                "net_size needs an input and an output width, got {:?}",
                self.net_size
            )));
        }
        Ok(())
    }

    /// Configured source name of a split, if any.
    pub fn source_name(&self, split: Split) -> Option<&str> {
        match split {
            Split::Train => self.train_data_name.as_deref(),
            Split::Valid => self.valid_data_name.as_deref(),
            Split::Test  => self.test_data_name.as_deref(),
        }
    }

    /// Source name of a split, or a ConfigError naming the missing key.
    pub fn require_source_name(&self, split: Split) -> Result<&str, BatchError> {
        self.source_name(split)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| BatchError::Config(format!("{split}_data_name is not set")))
    }

    /// Splits that have a source name configured, in processing order.
    pub fn configured_splits(&self) -> Vec<Split> {
        Split::ALL
            .into_iter()
            .filter(|s| self.require_source_name(*s).is_ok())
            .collect()
    }

    /// Declared network input width.
    pub fn input_width(&self) -> Option<usize> {
        self.net_size.first().copied()
    }

    /// Declared network output width.
    pub fn output_width(&self) -> Option<usize> {
        self.net_size.last().copied()
    }

    /// Target encoding implied by the loss function.
    pub fn target_encoding(&self) -> Result<TargetEncoding, BatchError> {
        let width = self
            .output_width()
            .ok_or_else(|| BatchError::Config("net_size is empty".into()))?;
        TargetEncoding::from_loss(self.loss_function, width)
    }

    /// Location of a split's raw data archive.
    pub fn raw_data_path(&self, split: Split) -> Result<PathBuf, BatchError> {
        Ok(self.data_location.join(self.require_source_name(split)?))
    }

    /// Location of a split's batch set archive.
    pub fn mini_batch_path(&self, split: Split) -> Result<PathBuf, BatchError> {
        let name = self.require_source_name(split)?;
        Ok(self.mini_batch_location.join(format!("{MINI_BATCH_PREFIX}{name}")))
    }
}
