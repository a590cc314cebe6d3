// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// Cross-cutting helpers used by the data pipeline and the
// orchestrator:
//
//   geodesy.rs      — geodetic → ECEF conversion and the run
//                     origin
//   staging.rs      — scoped staging directories, removed on
//                     every exit path
//   fs_ops.rs       — mkdir / move / listing helpers
//   config_store.rs — setup_config.json persistence
//   report.rs       — setup_summary.csv with per-dataset item
//                     counts

/// WGS84 geodetic → ECEF conversion
pub mod geodesy;

/// Staging directory guard
pub mod staging;

/// Small filesystem helpers
pub mod fs_ops;

/// Run configuration persistence
pub mod config_store;

/// Per-dataset item count summary
pub mod report;
