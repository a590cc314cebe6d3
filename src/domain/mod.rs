// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure types and traits describing the dataset assembly:
// where the coordinates are anchored, how capture folders are
// recognised and paired, which categories exist, and which
// collaborators the pipeline calls.
//
// Rules for this layer:
//   - no directory walking or file copying
//   - only plain Rust structs, enums and traits

/// Error taxonomy shared by every layer
pub mod error;

/// Geodetic reference point and the ECEF origin
pub mod origin;

/// Folder roles decoded from names, matched sim/real pairs
pub mod capture;

/// The five categories and their split directory names
pub mod category;

/// Collaborator contracts (section processor, splitter)
pub mod traits;
