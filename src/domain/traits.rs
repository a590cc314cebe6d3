// ============================================================
// Layer 3 — Collaborator Traits
// ============================================================
// The orchestrator only knows two collaborators by their
// contract:
//
//   SectionProcessor — turns one source folder into a
//                      processed section under
//                      <dst_root>/<category>/
//   DatasetSplitter  — partitions a category's staged sections
//                      into train_/val_/test_ datasets
//
// The default implementations live in Layer 4 (data). Tests in
// Layer 2 swap in recording doubles.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::error::Result;
use crate::domain::origin::Origin;

// ─── ProcessOptions ───────────────────────────────────────────────────────────
/// Sampling policy shared by every processed folder in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Downsampling rate for 3D label maps
    pub stride: usize,

    /// Only keep RGB and semantics
    pub ignore_3d_label: bool,

    /// Apply `stride` to semantic maps too
    pub force_semantics_downsampling: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            stride: 8,
            ignore_3d_label: false,
            force_semantics_downsampling: false,
        }
    }
}

// ─── ProcessRequest ───────────────────────────────────────────────────────────
/// One (folder, category) unit of work.
#[derive(Debug, Clone, Copy)]
pub struct ProcessRequest<'a> {
    /// Synthetic capture folder (labels always come from here)
    pub source:      &'a Path,
    /// Real capture folder; None for synthetic-only categories
    pub paired_real: Option<&'a Path>,
    /// Directory name of the section under `<dst_root>/<category>/`
    pub section:     &'a str,
    pub dst_root:    &'a Path,
    pub category:    Category,
    pub origin:      &'a Origin,
    pub options:     &'a ProcessOptions,
}

// ─── SectionProcessor ─────────────────────────────────────────────────────────
pub trait SectionProcessor {
    /// Write a processed section for `request.source` under
    /// `<dst_root>/<category>/<section>/`. Any error aborts the run.
    fn process(&self, request: &ProcessRequest<'_>) -> Result<()>;
}

// ─── DatasetSplitter ──────────────────────────────────────────────────────────
pub trait DatasetSplitter {
    /// Consume every section under `staging_dir` and create the
    /// category's train/val/test datasets next to it.
    fn split(
        &self,
        staging_dir:     &Path,
        category:        Category,
        benchmark:       &str,
        ignore_3d_label: bool,
    ) -> Result<()>;
}
