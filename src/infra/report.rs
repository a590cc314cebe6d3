// ============================================================
// Layer 5 — Setup Summary Report
// ============================================================
// Records how many items ended up in every durable dataset of
// a run, as a CSV file in the output directory:
//
//   dataset,items
//   train_sim,812
//   val_sim,102
//   ...
//   train_sim_plus_drone_sim,1540
//
// Rows are also logged at info level as they are added.

use anyhow::Result;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

pub const SUMMARY_FILE: &str = "setup_summary.csv";

/// One row of the summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCount {
    pub dataset: String,
    pub items:   usize,
}

#[derive(Debug, Default)]
pub struct SetupReport {
    rows: Vec<DatasetCount>,
}

impl SetupReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dataset: impl Into<String>, items: usize) {
        let dataset = dataset.into();
        tracing::info!("{:<32} {:>8} items", dataset, items);
        self.rows.push(DatasetCount { dataset, items });
    }

    pub fn rows(&self) -> &[DatasetCount] {
        &self.rows
    }

    /// Write the CSV into `dir`, replacing any previous summary.
    pub fn write_csv(&self, dir: &Path) -> Result<PathBuf> {
        let csv_path = dir.join(SUMMARY_FILE);
        let mut f = fs::File::create(&csv_path)?;

        writeln!(f, "dataset,items")?;
        for row in &self.rows {
            writeln!(f, "{},{}", row.dataset, row.items)?;
        }

        tracing::debug!("Wrote setup summary: '{}'", csv_path.display());
        Ok(csv_path)
    }
}
