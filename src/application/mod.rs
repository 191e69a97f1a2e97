// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates validation, batch building and persistence.
//
// Rules for this layer:
//   - No padding or masking arithmetic here (Layer 4)
//   - No archive format details here (Layer 6)
//   - No printing here (Layer 1)
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Data configuration loaded from JSON / CLI flags
pub mod config;

// Per-split validate / build / load / delete
pub mod handler;

// Workflows behind the CLI commands
pub mod prepare_use_case;
