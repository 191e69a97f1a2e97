// ============================================================
// Layer 5 — ML / Backend Layer (Burn)
// ============================================================
// The only layer that builds burn tensors.
//
// Batches are built and stored as plain arrays; this layer is
// the array backend that turns them into device tensors when
// a training loop asks for them.
//
//   tensors.rs — MiniBatch → SequenceBatch<B> for any Backend
//
// Reference: Burn Book §3 (Building Blocks)

/// Stored batch → burn tensor conversion
pub mod tensors;
