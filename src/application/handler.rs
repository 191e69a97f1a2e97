// ============================================================
// Layer 2 — Mini-Batch Handler
// ============================================================
// Owns everything one run needs to validate, build, load and
// delete the batch sets of the configured splits:
//
//   DataConfig          read-only settings
//   SplitRegistry       metadata written by validation
//   RawDataStore        raw (x, y) archives
//   BatchStore          mb_of_* archives
//   MiniBatchBuilder    padding / masking
//   PermutationSource   training-split order
//
// build(split):
//   1. validate the split if it has not been validated yet
//   2. delete any batch set already stored for the split
//   3. read raw data, order samples, build every batch
//   4. write the whole batch set in one archive dump
//
// Builds of the same split must not run concurrently against
// the same mini_batch_location; step 2 and step 4 are not
// atomic across processes.

use crate::application::config::DataConfig;
use crate::data::{batcher::MiniBatchBuilder, sampler::SeededPermutation, validator::DatasetValidator};
use crate::domain::{
    batch::BatchSet,
    error::Result,
    meta::{SplitMeta, SplitRegistry},
    split::Split,
    traits::{PermutationSource, SequenceArchive},
};
use crate::infra::{batch_store::BatchStore, raw_store::RawDataStore};

pub struct MiniBatchHandler {
    config:       DataConfig,
    registry:     SplitRegistry,
    raw:          Box<dyn SequenceArchive>,
    store:        BatchStore,
    builder:      MiniBatchBuilder,
    permutations: Box<dyn PermutationSource>,
}

impl MiniBatchHandler {
    /// Handler over file archives, seeded from `config.seed`.
    pub fn new(config: DataConfig) -> Result<Self> {
        let builder = MiniBatchBuilder::from_config(&config)?;
        Ok(Self {
            registry:     SplitRegistry::new(),
            raw:          Box::new(RawDataStore::new(config.clone())),
            store:        BatchStore::new(config.clone()),
            permutations: Box::new(SeededPermutation::new(config.seed)),
            builder,
            config,
        })
    }

    /// Replace the permutation source used for the training split.
    pub fn with_permutations(mut self, permutations: Box<dyn PermutationSource>) -> Self {
        self.permutations = permutations;
        self
    }

    /// Replace the raw data source.
    pub fn with_source(mut self, raw: Box<dyn SequenceArchive>) -> Self {
        self.raw = raw;
        self
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    pub fn registry(&self) -> &SplitRegistry {
        &self.registry
    }

    pub fn store(&self) -> &BatchStore {
        &self.store
    }

    pub fn validate(&mut self, split: Split) -> Result<SplitMeta> {
        DatasetValidator::new(&self.config, self.raw.as_ref())?.validate(split, &mut self.registry)
    }

    pub fn validate_all(&mut self) -> Result<Vec<(Split, SplitMeta)>> {
        DatasetValidator::new(&self.config, self.raw.as_ref())?.validate_all(&mut self.registry)
    }

    /// Build and store the batch set of a split, replacing any previous one.
    pub fn build(&mut self, split: Split) -> Result<BatchSet> {
        let meta = match self.registry.checked(split) {
            Some(meta) => meta,
            None => self.validate(split)?,
        };

        if self.store.exists(split)? {
            self.store.delete(split)?;
        }

        let set = {
            let raw = self.raw.load_raw(split, self.builder.encoding())?;
            self.builder.build(split, &meta, &raw, self.permutations.as_mut())?
        };

        self.store.save(split, &set)?;
        tracing::info!("Built {} {} mini-batches", set.len(), split);
        Ok(set)
    }

    /// Build a split given by name. Unknown names are an InvalidArgument.
    pub fn build_named(&mut self, split: &str) -> Result<BatchSet> {
        self.build(split.parse()?)
    }

    /// Build every configured split, in train / valid / test order.
    pub fn build_all(&mut self) -> Result<Vec<(Split, BatchSet)>> {
        self.config
            .configured_splits()
            .into_iter()
            .map(|split| Ok((split, self.build(split)?)))
            .collect()
    }

    pub fn load(&self, split: Split) -> Result<BatchSet> {
        self.store.load(split)
    }

    pub fn delete(&self, split: Split) -> Result<()> {
        self.store.delete(split)
    }
}
