// ============================================================
// Layer 4 — Mini-Batch Builder
// ============================================================
// Turns the raw, variable-length samples of a validated split
// into padded, masked mini-batches.
//
// How batching works here:
//   1. Order the sample indices (identity, or a permutation
//      for the training split).
//   2. Cut the order into batch_quantity slices of exactly
//      batch_size indices. Leftover indices are discarded.
//   3. For each slice, pad every sample to the slice's own
//      longest input (no global bucketing):
//
//        input  [max_seq_len, batch_size, x_size]
//        mask   [max_seq_len, batch_size, 1]
//        target [max_seq_len, batch_size, y_size]       frame
//               [batch_size, 2 * max_label_len + 1]     CTC
//
//   4. Cast the finished arrays to the configured precision.
//
// Example, batch_size = 2, x_size = 1, lengths 3 and 1:
//
//        slot 0   slot 1         mask
//   t=0  [x00]    [x10]          1  1
//   t=1  [x01]    [0.0]          1  0
//   t=2  [x02]    [0.0]          1  0
//
// Every batch is finished before anything is returned, so a
// failure in batch j never leaves batches 0..j behind.
//
// Reference: Graves (2012) Supervised Sequence Labelling with RNNs
//            Rust Book §8 (Slices)

use crate::application::config::DataConfig;
use crate::data::sampler::sample_order;
use crate::domain::{
    batch::{BatchSet, FloatArray, FloatPrecision, MiniBatch, PaddedArray},
    encoding::{encode_ctc_labels, TargetEncoding},
    error::{BatchError, Result},
    meta::SplitMeta,
    sample::{RawSplit, RawTargets},
    split::Split,
    traits::PermutationSource,
};

// ─── MiniBatchBuilder ─────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy)]
pub struct MiniBatchBuilder {
    batch_size: usize,
    encoding:   TargetEncoding,
    precision:  FloatPrecision,
}

impl MiniBatchBuilder {
    pub fn new(batch_size: usize, encoding: TargetEncoding, precision: FloatPrecision) -> Self {
        Self { batch_size, encoding, precision }
    }

    pub fn from_config(cfg: &DataConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self::new(cfg.batch_size, cfg.target_encoding()?, cfg.precision))
    }

    pub fn encoding(&self) -> TargetEncoding {
        self.encoding
    }

    /// Build every mini-batch of a split.
    ///
    /// `meta` must come from validating the same raw data.
    /// `permutations` is only consulted for the training split.
    pub fn build(
        &self,
        split:        Split,
        meta:         &SplitMeta,
        raw:          &RawSplit,
        permutations: &mut dyn PermutationSource,
    ) -> Result<BatchSet> {
        if raw.len() != meta.set_len || raw.y.len() != meta.set_len {
            return Err(BatchError::inconsistent(format!(
                "{split} data changed since validation: expected {} samples, found x={} y={}",
                meta.set_len,
                raw.len(),
                raw.y.len()
            )));
        }

        let x_len = raw.x_lengths();
        let y_len = raw.y_lengths();
        if !self.encoding.is_ctc() && x_len != y_len {
            return Err(BatchError::inconsistent(format!(
                "{split} x and y sequences do not have the same length"
            )));
        }

        let order = sample_order(split.sample_order(), meta.set_len, permutations)?;
        let used  = meta.batch_quantity * self.batch_size;

        let mut set = BatchSet::with_capacity(meta.batch_quantity);
        for (j, selection) in order[..used].chunks_exact(self.batch_size).enumerate() {
            let batch = self.build_batch(selection, raw, &x_len, &y_len, meta)?;
            tracing::debug!(
                "{} batch {}: max_seq_len={}, active timesteps={}",
                split,
                j,
                batch.max_seq_len(),
                batch.active_timesteps()
            );
            set.push(batch);
        }

        Ok(set)
    }

    /// Pad and mask one slice of sample indices.
    fn build_batch(
        &self,
        selection: &[usize],
        raw:       &RawSplit,
        x_len:     &[usize],
        y_len:     &[usize],
        meta:      &SplitMeta,
    ) -> Result<MiniBatch> {
        let batch_size  = self.batch_size;
        let max_seq_len = selection.iter().map(|&s| x_len[s]).max().unwrap_or(0);

        let mut input  = PaddedArray::zeros(&[max_seq_len, batch_size, meta.x_size]);
        let mut mask   = PaddedArray::zeros(&[max_seq_len, batch_size, 1]);
        let mut target = match self.encoding {
            TargetEncoding::Frame => PaddedArray::zeros(&[max_seq_len, batch_size, meta.y_size]),
            TargetEncoding::Ctc { .. } => {
                let max_y_len = selection.iter().map(|&s| y_len[s]).max().unwrap_or(0);
                PaddedArray::zeros(&[batch_size, 2 * max_y_len + 1])
            }
        };

        for (k, &s) in selection.iter().enumerate() {
            let sample_length = x_len[s];
            copy_frames(&mut input, k, &raw.x[s], meta.x_size, "x", s)?;

            let mask_channels = match (self.encoding, &raw.y) {
                (TargetEncoding::Frame, RawTargets::Frames(ys)) => {
                    copy_frames(&mut target, k, &ys[s], meta.y_size, "y", s)?;
                    1
                }
                (TargetEncoding::Ctc { blank }, RawTargets::Labels(labels)) => {
                    let encoded = encode_ctc_labels(&labels[s], blank)?;
                    let row     = target.row_mut(&[k]);
                    for (dst, &sym) in row.iter_mut().zip(&encoded) {
                        *dst = sym as f64;
                    }
                    // channel range bounded by the encoded label length
                    encoded.len().min(1)
                }
                _ => {
                    return Err(BatchError::inconsistent(
                        "target data does not match the configured loss function",
                    ))
                }
            };

            for t in 0..sample_length {
                mask.row_mut(&[t, k])[..mask_channels].fill(1.0);
            }
        }

        let batch = MiniBatch {
            input:  input.cast(self.precision),
            target: target.cast(self.precision),
            mask:   mask.cast(self.precision),
        };
        self.check_finite(&batch.input, "x", selection)?;
        self.check_finite(&batch.target, "y", selection)?;
        Ok(batch)
    }

    /// Stored arrays must hold only finite values; the archive cannot
    /// represent NaN or infinity. Values that overflow the cast land here.
    fn check_finite(&self, array: &FloatArray, name: &str, selection: &[usize]) -> Result<()> {
        let Some(index) = array.first_non_finite() else {
            return Ok(());
        };
        // slot axis: [T, B, w] → 1, CTC [B, L] → 0
        let slot   = index[array.shape().len() - 2];
        let sample = selection[slot];
        Err(BatchError::inconsistent(format!(
            "sample {sample} {name} has a value at {index:?} that is not finite as {:?}",
            self.precision
        )))
    }
}

/// Copy a sample's frames into slot `slot`, timestep by timestep.
/// Timesteps past the sequence stay zero.
fn copy_frames(
    dst:    &mut PaddedArray,
    slot:   usize,
    frames: &[Vec<f64>],
    width:  usize,
    name:   &str,
    sample: usize,
) -> Result<()> {
    for (t, frame) in frames.iter().enumerate() {
        if frame.len() != width {
            return Err(BatchError::inconsistent(format!(
                "sample {sample} {name} timestep {t} has width {}, expected {width}",
                frame.len()
            )));
        }
        dst.row_mut(&[t, slot]).copy_from_slice(frame);
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sampler::SeededPermutation;
    use crate::data::validator::tests::seq;
    use std::collections::HashSet;

    struct Fixed(Vec<usize>);

    impl PermutationSource for Fixed {
        fn permutation(&mut self, _n: usize) -> Vec<usize> {
            self.0.clone()
        }
    }

    fn meta(set_len: usize, batch_size: usize, x_size: usize, y_size: usize) -> SplitMeta {
        SplitMeta {
            set_len,
            x_size,
            y_size,
            batch_quantity: set_len / batch_size,
            checked: true,
        }
    }

    /// Sample i has length `lengths[i]`; x at step t is `100 * i + 1 + t`
    /// and y is `-100 * i - 50 + t`, so no real value is ever zero.
    fn frame_raw(lengths: &[usize]) -> RawSplit {
        RawSplit::new(
            lengths.iter().enumerate().map(|(i, &l)| seq(l, 2, 100.0 * i as f64 + 1.0)).collect(),
            RawTargets::Frames(
                lengths.iter().enumerate().map(|(i, &l)| seq(l, 1, -100.0 * i as f64 - 50.0)).collect(),
            ),
        )
    }

    fn frame_builder(batch_size: usize) -> MiniBatchBuilder {
        MiniBatchBuilder::new(batch_size, TargetEncoding::Frame, FloatPrecision::F64)
    }

    /// Recover which sample sits in slot k from its first x value.
    fn sample_in_slot(batch: &MiniBatch, k: usize) -> usize {
        ((batch.input.get(&[0, k, 0]) - 1.0) / 100.0).round() as usize
    }

    #[test]
    fn test_valid_split_keeps_order_and_drops_remainder() {
        let raw   = frame_raw(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        let set   = frame_builder(4)
            .build(Split::Valid, &meta(10, 4, 2, 1), &raw, &mut SeededPermutation::new(Some(0)))
            .unwrap();
        let batches = set.into_batches();
        assert_eq!(batches.len(), 2);

        let slots: Vec<Vec<usize>> = batches
            .iter()
            .map(|b| (0..4).map(|k| sample_in_slot(b, k)).collect())
            .collect();
        assert_eq!(slots, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
    }

    #[test]
    fn test_train_split_uses_permutation() {
        let raw   = frame_raw(&[1; 10]);
        let order = vec![9, 3, 0, 7, 1, 2, 4, 5, 6, 8];
        let set   = frame_builder(4)
            .build(Split::Train, &meta(10, 4, 2, 1), &raw, &mut Fixed(order))
            .unwrap();
        let batches = set.into_batches();

        let slots: Vec<usize> = batches
            .iter()
            .flat_map(|b| (0..4).map(move |k| sample_in_slot(b, k)))
            .collect();
        assert_eq!(slots, vec![9, 3, 0, 7, 1, 2, 4, 5]);
    }

    #[test]
    fn test_dropped_samples_never_appear() {
        let raw = frame_raw(&[2; 10]);
        let set = frame_builder(4)
            .build(Split::Train, &meta(10, 4, 2, 1), &raw, &mut SeededPermutation::new(Some(3)))
            .unwrap();

        let seen: HashSet<usize> = set
            .into_batches()
            .iter()
            .flat_map(|b| (0..4).map(move |k| sample_in_slot(b, k)).collect::<Vec<_>>())
            .collect();
        assert_eq!(seen.len(), 8);
        assert!(seen.iter().all(|&s| s < 10));
    }

    #[test]
    fn test_shapes_and_zero_padding() {
        let lengths = [3, 1, 5, 2];
        let raw     = frame_raw(&lengths);
        let batch   = frame_builder(4)
            .build(Split::Test, &meta(4, 4, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap()
            .into_batches()
            .remove(0);

        assert_eq!(batch.input.shape(), &[5, 4, 2]);
        assert_eq!(batch.target.shape(), &[5, 4, 1]);
        assert_eq!(batch.mask.shape(), &[5, 4, 1]);

        for (k, &len) in lengths.iter().enumerate() {
            for t in 0..5 {
                let active = t < len;
                assert_eq!(batch.mask.get(&[t, k, 0]), if active { 1.0 } else { 0.0 });
                for f in 0..2 {
                    let v = batch.input.get(&[t, k, f]);
                    if active {
                        assert_eq!(v, 100.0 * k as f64 + 1.0 + t as f64);
                    } else {
                        assert_eq!(v, 0.0);
                    }
                }
                let y = batch.target.get(&[t, k, 0]);
                assert_eq!(y == 0.0, !active);
            }
        }
    }

    #[test]
    fn test_each_batch_pads_to_its_own_max() {
        let raw = frame_raw(&[2, 3, 7, 1]);
        let set = frame_builder(2)
            .build(Split::Valid, &meta(4, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap();
        assert_eq!(set.inputs[0].shape()[0], 3);
        assert_eq!(set.inputs[1].shape()[0], 7);
    }

    #[test]
    fn test_frame_length_mismatch_fails() {
        let mut raw = frame_raw(&[3, 3]);
        raw.y = RawTargets::Frames(vec![seq(3, 1, 0.0), seq(2, 1, 0.0)]);
        let err = frame_builder(2)
            .build(Split::Valid, &meta(2, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }

    #[test]
    fn test_ragged_frame_width_fails() {
        let mut raw = frame_raw(&[2, 2]);
        raw.x[1][1] = vec![1.0, 2.0, 3.0];
        let err = frame_builder(2)
            .build(Split::Valid, &meta(2, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(err.to_string().contains("sample 1 x timestep 1"));
    }

    #[test]
    fn test_set_len_drift_fails() {
        let raw = frame_raw(&[2, 2, 2]);
        let err = frame_builder(2)
            .build(Split::Valid, &meta(4, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }

    #[test]
    fn test_precision_is_applied() {
        let raw     = frame_raw(&[1, 1]);
        let builder = MiniBatchBuilder::new(2, TargetEncoding::Frame, FloatPrecision::F32);
        let set     = builder
            .build(Split::Valid, &meta(2, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap();
        assert!(set.inputs.iter().chain(&set.targets).chain(&set.masks).all(|a| a.precision() == FloatPrecision::F32));
    }

    #[test]
    fn test_value_overflowing_precision_fails() {
        let mut raw = frame_raw(&[2, 3]);
        raw.x[1][2][0] = 1.0e39;
        let meta = meta(2, 2, 2, 1);

        let err = MiniBatchBuilder::new(2, TargetEncoding::Frame, FloatPrecision::F32)
            .build(Split::Valid, &meta, &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
        assert!(err.to_string().contains("sample 1 x"));

        // representable in f64
        assert!(frame_builder(2)
            .build(Split::Valid, &meta, &raw, &mut SeededPermutation::new(None))
            .is_ok());
    }

    #[test]
    fn test_nan_target_fails() {
        let mut raw = frame_raw(&[2, 2]);
        if let RawTargets::Frames(ys) = &mut raw.y {
            ys[0][1][0] = f64::NAN;
        }
        let err = frame_builder(2)
            .build(Split::Valid, &meta(2, 2, 2, 1), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(err.to_string().contains("sample 0 y"));
    }

    // ── CTC mode ──────────────────────────────────────────────────────────────

    fn ctc_builder(batch_size: usize, y_size: usize) -> MiniBatchBuilder {
        MiniBatchBuilder::new(batch_size, TargetEncoding::Ctc { blank: y_size - 1 }, FloatPrecision::F32)
    }

    #[test]
    fn test_ctc_encoded_row_and_mask() {
        let raw = RawSplit::new(vec![seq(5, 2, 1.0)], RawTargets::Labels(vec![vec![1, 2]]));
        let batch = ctc_builder(1, 5)
            .build(Split::Valid, &meta(1, 1, 2, 5), &raw, &mut SeededPermutation::new(None))
            .unwrap()
            .into_batches()
            .remove(0);

        assert_eq!(batch.target.shape(), &[1, 5]);
        assert_eq!(batch.target.to_f64_vec(), vec![4.0, 1.0, 4.0, 2.0, 4.0]);
        assert_eq!(batch.mask.shape(), &[5, 1, 1]);
        assert_eq!(batch.active_timesteps(), 5);
    }

    #[test]
    fn test_ctc_rows_are_left_aligned_and_zero_padded() {
        let raw = RawSplit::new(
            vec![seq(7, 2, 1.0), seq(3, 2, 1.0)],
            RawTargets::Labels(vec![vec![0], vec![3, 1, 2]]),
        );
        let batch = ctc_builder(2, 5)
            .build(Split::Test, &meta(2, 2, 2, 5), &raw, &mut SeededPermutation::new(None))
            .unwrap()
            .into_batches()
            .remove(0);

        // 2 * 3 + 1 columns for the longest label sequence
        assert_eq!(batch.target.shape(), &[2, 7]);
        assert_eq!(
            batch.target.to_f64_vec(),
            vec![
                4.0, 0.0, 4.0, 0.0, 0.0, 0.0, 0.0, // [blank, 0, blank] + padding
                4.0, 3.0, 4.0, 1.0, 4.0, 2.0, 4.0,
            ]
        );

        // mask follows the input lengths (time axis), not the label lengths
        assert_eq!(batch.mask.shape(), &[7, 2, 1]);
        for t in 0..7 {
            assert_eq!(batch.mask.get(&[t, 0, 0]), 1.0);
            assert_eq!(batch.mask.get(&[t, 1, 0]), if t < 3 { 1.0 } else { 0.0 });
        }
    }

    #[test]
    fn test_ctc_ignores_length_mismatch_between_x_and_labels() {
        let raw = RawSplit::new(vec![seq(2, 2, 1.0); 2], RawTargets::Labels(vec![vec![1, 1, 1, 1], vec![]]));
        assert!(ctc_builder(2, 3)
            .build(Split::Valid, &meta(2, 2, 2, 3), &raw, &mut SeededPermutation::new(None))
            .is_ok());
    }

    #[test]
    fn test_ctc_label_out_of_space_fails() {
        let raw = RawSplit::new(vec![seq(2, 2, 1.0)], RawTargets::Labels(vec![vec![4]]));
        let err = ctc_builder(1, 5)
            .build(Split::Valid, &meta(1, 1, 2, 5), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }

    #[test]
    fn test_encoding_target_mismatch_fails() {
        let raw = frame_raw(&[2]);
        let err = ctc_builder(1, 3)
            .build(Split::Valid, &meta(1, 1, 2, 3), &raw, &mut SeededPermutation::new(None))
            .unwrap_err();
        assert!(matches!(err, BatchError::DataInconsistency(_)));
    }
}
