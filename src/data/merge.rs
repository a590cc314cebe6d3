// ============================================================
// Layer 4 — Virtual Merge Builder
// ============================================================
// Combines two split training datasets into one logical
// training set without copying or linking any frame file.
//
// The destination directory only holds merge.json:
//
//   {
//     "benchmark": "urbanscape",
//     "ignore_3d_label": false,
//     "sources": ["train_sim", "train_drone_sim"]
//   }
//
// Sources living next to the destination are stored by name,
// anything else by absolute path. Readers resolve the sources
// when they open the view (data::view), so the merge never goes
// stale and never owns frame data.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::splitter::DatasetMeta;
use crate::domain::error::{Result, SetupError};
use crate::infra::fs_ops::recreate_dir;

pub const MERGE_INDEX_FILE: &str = "merge.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeIndex {
    pub benchmark:       String,
    pub ignore_3d_label: bool,
    pub sources:         Vec<PathBuf>,
}

impl MergeIndex {
    pub fn load(dir: &Path) -> Result<Self> {
        let json = fs::read_to_string(dir.join(MERGE_INDEX_FILE))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Source paths made absolute against the merge directory's parent
    pub fn resolved_sources(&self, merge_dir: &Path) -> Vec<PathBuf> {
        let base = merge_dir.parent().unwrap_or(merge_dir);
        self.sources
            .iter()
            .map(|s| if s.is_absolute() { s.clone() } else { base.join(s) })
            .collect()
    }
}

/// Build a virtual merge of exactly two split datasets at `destination`.
///
/// Both sources must exist and agree on benchmark and label format.
/// Running it again replaces the index with an identical one.
pub fn merge(sources: &[PathBuf], destination: &Path) -> Result<MergeIndex> {
    let [first, second] = sources else {
        return Err(SetupError::config(format!(
            "a virtual merge takes exactly two datasets, got {}",
            sources.len()
        )));
    };

    let first_meta  = source_meta(first)?;
    let second_meta = source_meta(second)?;

    if first_meta.ignore_3d_label != second_meta.ignore_3d_label {
        return Err(SetupError::config(format!(
            "cannot merge '{}' (ignore_3d_label={}) with '{}' (ignore_3d_label={})",
            first.display(),
            first_meta.ignore_3d_label,
            second.display(),
            second_meta.ignore_3d_label
        )));
    }
    if first_meta.benchmark != second_meta.benchmark {
        return Err(SetupError::config(format!(
            "cannot merge benchmarks '{}' and '{}'",
            first_meta.benchmark, second_meta.benchmark
        )));
    }

    let index = MergeIndex {
        benchmark:       first_meta.benchmark,
        ignore_3d_label: first_meta.ignore_3d_label,
        sources:         vec![
            relative_to_sibling(first, destination),
            relative_to_sibling(second, destination),
        ],
    };

    recreate_dir(destination)?;
    fs::write(destination.join(MERGE_INDEX_FILE), serde_json::to_string_pretty(&index)?)?;

    tracing::info!(
        "Virtual merge '{}' ← {}",
        destination.display(),
        index
            .sources
            .iter()
            .map(|s| s.display().to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    );

    Ok(index)
}

fn source_meta(source: &Path) -> Result<DatasetMeta> {
    if !source.is_dir() {
        return Err(SetupError::config(format!(
            "merge source '{}' does not exist",
            source.display()
        )));
    }
    DatasetMeta::load(source)
}

fn relative_to_sibling(source: &Path, destination: &Path) -> PathBuf {
    match (source.parent(), destination.parent(), source.file_name()) {
        (Some(a), Some(b), Some(name)) if a == b => PathBuf::from(name),
        _ => fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf()),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::view::DatasetView;
    use crate::domain::category::{Category, Split};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn make_dataset(dir: &Path, category: Category, ids: &[&str], ignore_3d_label: bool) {
        fs::create_dir_all(dir.join("rgb")).unwrap();
        for id in ids {
            fs::write(dir.join("rgb").join(format!("{id}.png")), b"").unwrap();
        }
        DatasetMeta {
            benchmark: "urbanscape".into(),
            category,
            split: Split::Train,
            ignore_3d_label,
            items: ids.len(),
        }
        .save(dir)
        .unwrap();
    }

    fn rgb_set(view: &DatasetView) -> BTreeSet<PathBuf> {
        view.items().iter().filter_map(|i| i.rgb().map(Path::to_path_buf)).collect()
    }

    #[test]
    fn test_merge_is_exact_union() {
        let tmp   = TempDir::new().unwrap();
        let sim   = tmp.path().join("train_sim");
        let drone = tmp.path().join("train_drone_sim");
        let dst   = tmp.path().join("train_sim_plus_drone_sim");
        make_dataset(&sim, Category::LhsSim, &["lhs_0000", "lhs_0001"], false);
        make_dataset(&drone, Category::DroneSim, &["site-sim_0000"], false);

        let index = merge(&[sim.clone(), drone.clone()], &dst).unwrap();
        assert_eq!(index.sources, vec![PathBuf::from("train_sim"), PathBuf::from("train_drone_sim")]);

        let merged   = rgb_set(&DatasetView::open(&dst).unwrap());
        let expected: BTreeSet<_> = rgb_set(&DatasetView::open(&sim).unwrap())
            .union(&rgb_set(&DatasetView::open(&drone).unwrap()))
            .cloned()
            .collect();
        assert_eq!(merged, expected);
        assert_eq!(merged.len(), 3);

        // only the index lives in the destination
        assert_eq!(fs::read_dir(&dst).unwrap().count(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let tmp   = TempDir::new().unwrap();
        let sim   = tmp.path().join("train_sim");
        let drone = tmp.path().join("train_oop_drone_sim");
        let dst   = tmp.path().join("train_sim_plus_oop_drone_sim");
        make_dataset(&sim, Category::LhsSim, &["a"], true);
        make_dataset(&drone, Category::OopDroneSim, &["b"], true);

        let first       = merge(&[sim.clone(), drone.clone()], &dst).unwrap();
        let first_view  = rgb_set(&DatasetView::open(&dst).unwrap());
        let second      = merge(&[sim, drone], &dst).unwrap();
        let second_view = rgb_set(&DatasetView::open(&dst).unwrap());

        assert_eq!(first, second);
        assert_eq!(first_view, second_view);
    }

    #[test]
    fn test_view_follows_source_changes() {
        let tmp   = TempDir::new().unwrap();
        let sim   = tmp.path().join("train_sim");
        let drone = tmp.path().join("train_drone_sim");
        let dst   = tmp.path().join("merged");
        make_dataset(&sim, Category::LhsSim, &["a"], false);
        make_dataset(&drone, Category::DroneSim, &["b"], false);
        merge(&[sim.clone(), drone], &dst).unwrap();

        fs::write(sim.join("rgb/c.png"), b"").unwrap();
        assert_eq!(DatasetView::open(&dst).unwrap().len(), 3);
    }

    #[test]
    fn test_mismatched_label_format_is_fatal() {
        let tmp   = TempDir::new().unwrap();
        let sim   = tmp.path().join("train_sim");
        let drone = tmp.path().join("train_drone_sim");
        make_dataset(&sim, Category::LhsSim, &["a"], false);
        make_dataset(&drone, Category::DroneSim, &["b"], true);

        let err = merge(&[sim, drone], &tmp.path().join("m")).unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
        assert!(!tmp.path().join("m").exists());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let sim = tmp.path().join("train_sim");
        make_dataset(&sim, Category::LhsSim, &["a"], false);

        let res = merge(&[sim, tmp.path().join("train_drone_sim")], &tmp.path().join("m"));
        assert!(res.is_err());
    }

    #[test]
    fn test_merge_requires_two_sources() {
        let tmp = TempDir::new().unwrap();
        let sim = tmp.path().join("train_sim");
        make_dataset(&sim, Category::LhsSim, &["a"], false);

        assert!(merge(&[sim], &tmp.path().join("m")).is_err());
    }
}
