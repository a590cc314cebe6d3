// ============================================================
// Layer 4 — Dataset Pipeline
// ============================================================
// Everything that touches dataset files on disk:
//
//   raw matching tree
//       │
//       ▼
//   discovery   → sorted sim/real pairs (in-place, out-of-place)
//       │
//       ▼
//   processor   → one processed section per (folder, category)
//       │
//       ▼
//   splitter    → train_/val_/test_ datasets per category
//       │
//       ▼
//   merge       → merge.json views over two training datasets
//       │
//       ▼
//   view        → what downstream consumers read
//
// frames.rs holds the per-frame file naming shared by the steps.

/// Leaf folder discovery and sim/real pairing
pub mod discovery;

/// Per-frame file naming convention
pub mod frames;

/// Default section processor (copy, recenter, downsample)
pub mod processor;

/// Seeded train/val/test splitting
pub mod splitter;

/// Index-based virtual merges
pub mod merge;

/// Physical and merged dataset readers
pub mod view;
