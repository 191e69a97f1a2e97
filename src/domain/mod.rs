// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits that describe what the
// batching system works with:
//
//   split.rs     — train / valid / test and their sample order
//   sample.rs    — raw, unpadded sequences of one split
//   encoding.rs  — frame vs. CTC target layout
//   batch.rs     — padded arrays, mini-batches, batch sets
//   meta.rs      — per-split values derived by the validator
//   error.rs     — the error taxonomy shared by every layer
//   traits.rs    — seams for storage and randomness
//
// Rules for this layer:
//   - NO burn types here
//   - NO file I/O
//   - Only plain data and the invariants that go with it
//
// Reference: Rust Book §5 (Structs), §6 (Enums), §10 (Traits)

pub mod batch;
pub mod encoding;
pub mod error;
pub mod meta;
pub mod sample;
pub mod split;
pub mod traits;
