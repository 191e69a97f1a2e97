// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Turns raw variable-length sequences into padded, masked
// mini-batches. The pipeline flows in this order:
//
//   RawSplit (x, y)
//       │
//       ▼
//   DatasetValidator  → checks counts and widths, records SplitMeta
//       │
//       ▼
//   sample_order      → identity, or a fresh permutation for train
//       │
//       ▼
//   MiniBatchBuilder  → zero-pads to the batch's longest sample,
//                       encodes CTC targets, writes the mask
//
// Nothing here touches the filesystem; raw data arrives
// through the SequenceArchive trait.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Split and sample-shape validation
pub mod validator;

/// Sample ordering and the seeded permutation source
pub mod sampler;

/// Padding, masking and CTC target construction
pub mod batcher;
