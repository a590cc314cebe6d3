// ============================================================
// Layer 5 — Setup Config Store
// ============================================================
// Persists the SetupConfig of a run next to the dataset it
// produced, so the exact parameters (reference point, stride,
// label flags) can be audited later.
//
// File layout:
//   <output_dir>/
//     setup_config.json   ← pretty-printed SetupConfig
//
// Reference: serde_json crate documentation

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::application::setup_use_case::SetupConfig;

pub const CONFIG_FILE: &str = "setup_config.json";

pub struct ConfigStore {
    /// Output directory of the run
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the config as JSON. The directory must already exist.
    pub fn save(&self, cfg: &SetupConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved setup config to '{}'", path.display());
        Ok(())
    }
}
