// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that reads or writes files:
//
//   archive.rs      — JSON key-value archive with an in-memory
//                     cache; one file per archive.
//
//   raw_store.rs    — Reads a split's raw x / y sequences from
//                     data_location/<name>.
//
//   batch_store.rs  — Saves, loads and deletes a split's batch
//                     set at mini_batch_location/mb_of_<name>.
//
//   batch_report.rs — Appends per-batch padding statistics to
//                     batch_report.csv.
//
// Reference: Rust Book §9 (Error Handling)

/// Key-value archive file
pub mod archive;

/// Raw split reader
pub mod raw_store;

/// Mini-batch persistence
pub mod batch_store;

/// Padding statistics CSV logger
pub mod batch_report;
