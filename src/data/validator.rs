// ============================================================
// Layer 4 — Dataset Validator
// ============================================================
// Checks a split's raw data against the declared network
// geometry and derives the values the builder needs:
//
//   set_len         number of samples
//   x_size          feature width of the first input sample
//   y_size          target width (frame) / output width (CTC)
//   batch_quantity  floor(set_len / batch_size)
//
// Samples beyond batch_quantity * batch_size never reach a
// batch. With set_len = 10 and batch_size = 4 two samples are
// dropped on every build.
//
// The raw data in storage is only read, never modified, so
// validating the same split twice yields the same metadata.

use crate::application::config::DataConfig;
use crate::domain::{
    encoding::TargetEncoding,
    error::{BatchError, Result},
    meta::{SplitMeta, SplitRegistry},
    split::Split,
    traits::SequenceArchive,
};

pub struct DatasetValidator<'a> {
    config:   &'a DataConfig,
    source:   &'a dyn SequenceArchive,
    encoding: TargetEncoding,
}

impl<'a> DatasetValidator<'a> {
    pub fn new(config: &'a DataConfig, source: &'a dyn SequenceArchive) -> Result<Self> {
        config.validate()?;
        let encoding = config.target_encoding()?;
        Ok(Self { config, source, encoding })
    }

    /// Validate one split and record its metadata in `registry`.
    pub fn validate(&self, split: Split, registry: &mut SplitRegistry) -> Result<SplitMeta> {
        self.config.require_source_name(split)?;
        let raw = self.source.load_raw(split, self.encoding)?;

        let set_len = raw.len();
        if raw.y.len() != set_len {
            return Err(BatchError::inconsistent(format!(
                "x and y of {split} data have different sample counts ({set_len} vs {})",
                raw.y.len()
            )));
        }

        let x_size = raw.x_width().ok_or_else(|| {
            BatchError::inconsistent(format!("{split} data has no first input timestep to size x from"))
        })?;
        let input_width = self.config.input_width().unwrap_or_default();
        if x_size != input_width {
            return Err(BatchError::inconsistent(format!(
                "{split} data x size ({x_size}) and net input size ({input_width}) are unequal"
            )));
        }

        let output_width = self.config.output_width().unwrap_or_default();
        let y_size = match self.encoding {
            TargetEncoding::Frame => {
                let y_size = raw.y_width().ok_or_else(|| {
                    BatchError::inconsistent(format!("{split} data has no first target timestep to size y from"))
                })?;
                if y_size != output_width {
                    return Err(BatchError::inconsistent(format!(
                        "{split} data y size ({y_size}) and net output size ({output_width}) are unequal"
                    )));
                }
                y_size
            }
            // label space size, taken from the network rather than the data
            TargetEncoding::Ctc { .. } => output_width,
        };

        let meta = SplitMeta {
            set_len,
            x_size,
            y_size,
            batch_quantity: set_len / self.config.batch_size,
            checked: true,
        };
        registry.record(split, meta);

        tracing::info!(
            "Validated {}: {} samples, x_size={}, y_size={}, {} batches ({} samples dropped)",
            split,
            meta.set_len,
            meta.x_size,
            meta.y_size,
            meta.batch_quantity,
            meta.dropped_samples(self.config.batch_size),
        );
        Ok(meta)
    }

    /// Validate every split that has a source name configured.
    /// Splits without a name are skipped.
    pub fn validate_all(&self, registry: &mut SplitRegistry) -> Result<Vec<(Split, SplitMeta)>> {
        self.config
            .configured_splits()
            .into_iter()
            .map(|split| Ok((split, self.validate(split, registry)?)))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{
        encoding::LossFunction,
        sample::{RawSplit, RawTargets, Sequence},
    };
    use std::collections::HashMap;

    /// In-memory raw data keyed by split, shared with the builder tests.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub(crate) splits: HashMap<Split, RawSplit>,
    }

    impl SequenceArchive for MemorySource {
        fn load_raw(&self, split: Split, _encoding: TargetEncoding) -> Result<RawSplit> {
            self.splits
                .get(&split)
                .cloned()
                .ok_or_else(|| BatchError::Config(format!("no {split} data")))
        }
    }

    /// `len` timesteps of width `width`; step t is filled with `base + t`.
    pub(crate) fn seq(len: usize, width: usize, base: f64) -> Sequence {
        (0..len).map(|t| vec![base + t as f64; width]).collect()
    }

    pub(crate) fn frame_config(batch_size: usize) -> DataConfig {
        DataConfig {
            train_data_name: Some("train".into()),
            valid_data_name: Some("valid".into()),
            batch_size,
            net_size: vec![3, 8, 2],
            ..DataConfig::default()
        }
    }

    fn frame_split(lengths: &[usize]) -> RawSplit {
        RawSplit::new(
            lengths.iter().map(|&l| seq(l, 3, 0.0)).collect(),
            RawTargets::Frames(lengths.iter().map(|&l| seq(l, 2, 0.0)).collect()),
        )
    }

    fn source_with(split: Split, raw: RawSplit) -> MemorySource {
        let mut src = MemorySource::default();
        src.splits.insert(split, raw);
        src
    }

    #[test]
    fn test_derives_metadata() {
        let cfg = frame_config(4);
        let src = source_with(Split::Train, frame_split(&[3; 10]));
        let mut reg = SplitRegistry::new();

        let meta = DatasetValidator::new(&cfg, &src).unwrap().validate(Split::Train, &mut reg).unwrap();
        assert_eq!(
            meta,
            SplitMeta { set_len: 10, x_size: 3, y_size: 2, batch_quantity: 2, checked: true }
        );
        assert_eq!(meta.dropped_samples(4), 2);
        assert_eq!(reg.checked(Split::Train), Some(meta));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let cfg = frame_config(3);
        let src = source_with(Split::Train, frame_split(&[2, 5, 1, 4, 4]));
        let mut reg = SplitRegistry::new();
        let v = DatasetValidator::new(&cfg, &src).unwrap();

        let first  = v.validate(Split::Train, &mut reg).unwrap();
        let second = v.validate(Split::Train, &mut reg).unwrap();
        assert_eq!(first, second);
        assert_eq!(src.splits[&Split::Train], frame_split(&[2, 5, 1, 4, 4]));
    }

    #[test]
    fn test_sample_count_mismatch() {
        let cfg = frame_config(2);
        let mut raw = frame_split(&[2, 2, 2]);
        raw.y = RawTargets::Frames(vec![seq(2, 2, 0.0); 2]);
        let src = source_with(Split::Train, raw);

        let err = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Train, &mut SplitRegistry::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }

    #[test]
    fn test_x_width_must_match_net_input() {
        let mut cfg = frame_config(2);
        cfg.net_size = vec![4, 8, 2];
        let src = source_with(Split::Train, frame_split(&[2, 2]));

        let err = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Train, &mut SplitRegistry::new())
            .unwrap_err();
        assert!(err.to_string().contains("x size"));
    }

    #[test]
    fn test_y_width_must_match_net_output_in_frame_mode() {
        let mut cfg = frame_config(2);
        cfg.net_size = vec![3, 8, 5];
        let src = source_with(Split::Train, frame_split(&[2, 2]));

        let err = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Train, &mut SplitRegistry::new())
            .unwrap_err();
        assert!(err.to_string().contains("y size"));
    }

    #[test]
    fn test_ctc_takes_y_size_from_network() {
        let mut cfg = frame_config(2);
        cfg.net_size      = vec![3, 8, 5];
        cfg.loss_function = LossFunction::Ctc;
        let src = source_with(
            Split::Train,
            RawSplit::new(vec![seq(4, 3, 0.0); 3], RawTargets::Labels(vec![vec![1, 2], vec![0], vec![]])),
        );

        let meta = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Train, &mut SplitRegistry::new())
            .unwrap();
        assert_eq!(meta.y_size, 5);
        assert_eq!(meta.batch_quantity, 1);
    }

    #[test]
    fn test_empty_split_is_inconsistent() {
        let cfg = frame_config(2);
        let src = source_with(Split::Train, frame_split(&[]));
        let err = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Train, &mut SplitRegistry::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }

    #[test]
    fn test_only_first_sample_sizes_the_split() {
        let cfg = frame_config(2);
        let v   = |raw| {
            let src = source_with(Split::Train, raw);
            DatasetValidator::new(&cfg, &src)
                .unwrap()
                .validate(Split::Train, &mut SplitRegistry::new())
        };

        let err = v(frame_split(&[0, 3])).unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));

        let meta = v(frame_split(&[3, 0])).unwrap();
        assert_eq!((meta.x_size, meta.y_size), (3, 2));
    }

    #[test]
    fn test_unnamed_split_is_config_error() {
        let cfg = frame_config(2);
        let src = source_with(Split::Test, frame_split(&[2]));
        let err = DatasetValidator::new(&cfg, &src)
            .unwrap()
            .validate(Split::Test, &mut SplitRegistry::new())
            .unwrap_err();
        assert!(matches!(err, BatchError::Config(_)));
    }

    #[test]
    fn test_zero_batch_size_rejected_up_front() {
        let cfg = frame_config(0);
        let src = MemorySource::default();
        assert!(matches!(DatasetValidator::new(&cfg, &src), Err(BatchError::Config(_))));
    }

    #[test]
    fn test_validate_all_covers_configured_splits() {
        let cfg = frame_config(2);
        let mut src = source_with(Split::Train, frame_split(&[2, 3, 4]));
        src.splits.insert(Split::Valid, frame_split(&[1, 1]));
        let mut reg = SplitRegistry::new();

        let metas = DatasetValidator::new(&cfg, &src).unwrap().validate_all(&mut reg).unwrap();
        let splits: Vec<Split> = metas.iter().map(|(s, _)| *s).collect();
        assert_eq!(splits, vec![Split::Train, Split::Valid]);
        assert!(reg.is_checked(Split::Valid));
        assert!(!reg.is_checked(Split::Test));
    }
}
