// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Seams between the batching core and its collaborators.
//
// The builder never touches an RNG directly. It asks a
// PermutationSource for an ordering, so tests can script the
// exact order and callers can seed it for reproducible runs.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::encoding::TargetEncoding;
use crate::domain::error::Result;
use crate::domain::sample::RawSplit;
use crate::domain::split::Split;

// ─── PermutationSource ────────────────────────────────────────────────────────
/// Anything that can produce a uniform random permutation of `0..n`.
///
/// Implementations:
///   - SeededPermutation → rand's StdRng, optionally seeded
///   - test doubles that return a fixed order
pub trait PermutationSource {
    fn permutation(&mut self, n: usize) -> Vec<usize>;
}

// ─── SequenceArchive ──────────────────────────────────────────────────────────
/// Raw (x, y) sequence storage for one split.
///
/// The encoding decides how targets are read: framewise vectors
/// or CTC label index sequences.
///
/// Implementations:
///   - RawDataStore → JSON key-value archive under `data_location`
///   - in-memory fixtures in tests
pub trait SequenceArchive {
    fn load_raw(&self, split: Split, encoding: TargetEncoding) -> Result<RawSplit>;
}
