// ============================================================
// Layer 6 — Raw Data Store
// ============================================================
// Reads a split's unbatched (x, y) sequences from its archive
// at {data_location}/{<split>_data_name}.
//
// A missing or unreadable archive, or a missing `x` / `y`
// field, means the data location or source name is wrong, so
// all of them surface as ConfigError. Content that exists but
// cannot be decoded is DataCorruption.

use std::path::Path;

use crate::application::config::DataConfig;
use crate::domain::{
    encoding::TargetEncoding,
    error::{BatchError, Result},
    sample::{RawSplit, RawTargets, Sequence},
    split::Split,
    traits::SequenceArchive,
};
use crate::infra::archive::FileArchive;

pub struct RawDataStore {
    config: DataConfig,
}

impl RawDataStore {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    fn open(&self, split: Split) -> Result<FileArchive> {
        let path = self.config.raw_data_path(split)?;
        let mut archive = FileArchive::open(&path);
        archive.load().map_err(|e| match e {
            BatchError::NotFound(_) => wrong_location(split, &path),
            BatchError::Io(io) => BatchError::Config(format!(
                "data_location or {split}_data_name wrong: cannot read '{}': {io}",
                path.display()
            )),
            other => other,
        })?;
        Ok(archive)
    }
}

impl SequenceArchive for RawDataStore {
    fn load_raw(&self, split: Split, encoding: TargetEncoding) -> Result<RawSplit> {
        let mut archive = self.open(split)?;
        let path        = archive.path().to_path_buf();

        let x: Vec<Sequence> = archive
            .take("x")?
            .ok_or_else(|| wrong_location(split, &path))?;

        let y = match encoding {
            TargetEncoding::Frame => archive.take::<Vec<Sequence>>("y")?.map(RawTargets::Frames),
            TargetEncoding::Ctc { .. } => archive.take::<Vec<Vec<usize>>>("y")?.map(RawTargets::Labels),
        }
        .ok_or_else(|| wrong_location(split, &path))?;

        tracing::debug!("Read {} raw {} samples from '{}'", x.len(), split, path.display());
        Ok(RawSplit::new(x, y))
    }
}

fn wrong_location(split: Split, path: &Path) -> BatchError {
    BatchError::Config(format!(
        "data_location or {split}_data_name wrong: no x/y data at '{}'",
        path.display()
    ))
}
