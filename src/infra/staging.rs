// ============================================================
// Layer 5 — Scoped Staging Directories
// ============================================================
// Each category accumulates processed sections in a staging
// directory (<dst>/<category>) until it is split. The staging
// directory is transient: it must be gone after the run, both
// when the split succeeds and when any step fails.
//
//   StagingDir::acquire  → creates the directory, dropping
//                          leftovers of an earlier run
//   StagingDir::finish   → removes it, propagating errors
//   Drop (unfinished)    → removes it, logging failures
//
// Durable outputs (train_/val_/test_ datasets) are never
// touched here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::category::Category;
use crate::domain::error::Result;
use crate::infra::fs_ops::recreate_dir;

#[derive(Debug)]
pub struct StagingDir {
    path:     PathBuf,
    category: Category,
    finished: bool,
}

impl StagingDir {
    /// Create an empty staging directory for `category`.
    pub fn acquire(dst_root: &Path, category: Category) -> Result<Self> {
        let path = category.staging_dir(dst_root);
        recreate_dir(&path)?;
        tracing::debug!("Acquired staging directory '{}'", path.display());
        Ok(Self { path, category, finished: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Remove the staging directory after a successful split.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        if self.path.exists() {
            fs::remove_dir_all(&self.path)?;
        }
        tracing::debug!("Removed staging directory '{}'", self.path.display());
        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.finished || !self.path.exists() {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::info!(
                "Discarded staging data of '{}' after an aborted run",
                self.category
            ),
            Err(e) => tracing::error!(
                "Cannot remove staging directory '{}': {}",
                self.path.display(),
                e
            ),
        }
    }
}
