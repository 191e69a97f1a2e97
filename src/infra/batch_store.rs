// ============================================================
// Layer 6 — Batch Store
// ============================================================
// Persists, loads and deletes the batch set of a split.
//
// File naming convention:
//   {mini_batch_location}/
//     mb_of_{train_data_name}   ← fields x, y, m
//     mb_of_{valid_data_name}
//     mb_of_{test_data_name}
//
// Each file holds three parallel lists of tensors:
//   x → padded inputs, y → targets, m → masks
// The i-th entry of each list belongs to mini-batch i.
//
// A batch set is only ever written as a whole: the builder
// finishes every batch before `save` is called.
//
// Reference: Rust Book §9 (Error Handling)

use std::path::PathBuf;

use crate::application::config::DataConfig;
use crate::domain::{
    batch::{BatchSet, FloatArray},
    error::{BatchError, Result},
    split::Split,
};
use crate::infra::archive::FileArchive;

pub struct BatchStore {
    config: DataConfig,
}

impl BatchStore {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Archive path of a split's batch set.
    pub fn path(&self, split: Split) -> Result<PathBuf> {
        self.config.mini_batch_path(split)
    }

    pub fn exists(&self, split: Split) -> Result<bool> {
        Ok(self.path(split)?.is_file())
    }

    /// Write a whole batch set, replacing any previous one.
    pub fn save(&self, split: Split, set: &BatchSet) -> Result<()> {
        let mut archive = FileArchive::open(self.path(split)?);
        archive.insert("x", &set.inputs)?;
        archive.insert("y", &set.targets)?;
        archive.insert("m", &set.masks)?;
        archive.dump()?;
        archive.clear();

        tracing::info!(
            "Stored {} {} mini-batches in '{}'",
            set.len(),
            split,
            archive.path().display()
        );
        Ok(())
    }

    /// Read a split's batch set back as (inputs, targets, masks).
    pub fn load(&self, split: Split) -> Result<BatchSet> {
        let mut archive = FileArchive::open(self.path(split)?);
        archive.load()?;

        let inputs  = required(&mut archive, "x")?;
        let targets = required(&mut archive, "y")?;
        let masks   = required(&mut archive, "m")?;
        archive.clear();

        let set = BatchSet::from_parts(inputs, targets, masks)?;
        tracing::debug!("Loaded {} {} mini-batches", set.len(), split);
        Ok(set)
    }

    /// Remove a split's batch set. NotFound if none was built.
    pub fn delete(&self, split: Split) -> Result<()> {
        let path = self.path(split)?;
        FileArchive::remove(&path)?;
        tracing::info!("Deleted {} mini-batches at '{}'", split, path.display());
        Ok(())
    }
}

fn required(archive: &mut FileArchive, key: &str) -> Result<Vec<FloatArray>> {
    archive.take(key)?.ok_or_else(|| {
        BatchError::DataCorruption(format!(
            "batch set '{}' has no '{key}' field",
            archive.path().display()
        ))
    })
}
