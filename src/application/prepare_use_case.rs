// ============================================================
// Layer 2 — PrepareUseCase
// ============================================================
// The workflows behind each CLI command:
//
//   check   → validate every configured split
//   build   → build one split (or all), store batch sets,
//             append padding stats to batch_report.csv and
//             save the effective config next to the batches
//   inspect → load a split's batch set and move it onto the
//             NdArray backend to confirm it is usable
//   delete  → remove a split's batch set
//
// Errors from the lower layers keep their category; this
// layer only adds which command and split were involved.

use anyhow::{Context, Result};

use crate::application::{config::DataConfig, handler::MiniBatchHandler};
use crate::domain::{batch::BatchSet, meta::SplitMeta, split::Split};
use crate::infra::batch_report::{BatchReport, BatchStats};
use crate::ml::tensors::to_device;

type InspectBackend = burn::backend::NdArray;

/// Which splits a build should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildTarget {
    One(String),
    All,
}

/// Shape summary of one stored batch, as seen on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub index:        usize,
    pub input_dims:   Vec<usize>,
    pub target_dims:  Vec<usize>,
    pub mask_dims:    Vec<usize>,
    pub active_steps: usize,
}

pub struct PrepareUseCase {
    handler: MiniBatchHandler,
}

impl PrepareUseCase {
    pub fn new(config: DataConfig) -> Result<Self> {
        let handler = MiniBatchHandler::new(config).context("Invalid data configuration")?;
        Ok(Self { handler })
    }

    pub fn check(&mut self) -> Result<Vec<(Split, SplitMeta)>> {
        let metas = self.handler.validate_all().context("Data set check failed")?;
        if metas.is_empty() {
            tracing::warn!("No split has a data name configured; nothing to check");
        }
        Ok(metas)
    }

    /// Build the requested splits. Returns the number of batches per split.
    pub fn build(&mut self, target: BuildTarget) -> Result<Vec<(Split, usize)>> {
        let built: Vec<(Split, BatchSet)> = match target {
            BuildTarget::One(name) => {
                let split: Split = name.parse()?;
                let set = self
                    .handler
                    .build(split)
                    .with_context(|| format!("Building {split} mini-batches failed"))?;
                vec![(split, set)]
            }
            BuildTarget::All => self.handler.build_all().context("Building mini-batches failed")?,
        };

        let location = &self.handler.config().mini_batch_location;
        let report   = BatchReport::new(location)
            .with_context(|| format!("Cannot open batch report in '{}'", location.display()))?;

        let mut counts = Vec::with_capacity(built.len());
        for (split, set) in built {
            let batches = set.into_batches();
            report.log(&BatchStats::collect(split, &batches))?;
            counts.push((split, batches.len()));
        }
        self.handler
            .config()
            .save(location.join("data_config.json"))?;

        Ok(counts)
    }

    pub fn inspect(&self, split: &str) -> Result<Vec<BatchSummary>> {
        let split: Split = split.parse()?;
        let set = self
            .handler
            .load(split)
            .with_context(|| format!("Cannot load {split} mini-batches"))?;

        let device  = Default::default();
        let batches = to_device::<InspectBackend>(&set, &device)?;
        tracing::info!("Loaded {} {} mini-batches onto {:?}", batches.len(), split, device);

        Ok(batches
            .iter()
            .zip(&set.masks)
            .enumerate()
            .map(|(index, (b, mask))| BatchSummary {
                index,
                input_dims:   b.input.dims().to_vec(),
                target_dims:  b.target.dims(),
                mask_dims:    b.mask.dims().to_vec(),
                active_steps: mask.sum() as usize,
            })
            .collect())
    }

    pub fn delete(&self, split: &str) -> Result<()> {
        let split: Split = split.parse()?;
        self.handler
            .delete(split)
            .with_context(|| format!("Cannot delete {split} mini-batches"))
    }
}
