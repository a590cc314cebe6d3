// ============================================================
// Layer 4 — Dataset Views
// ============================================================
// How downstream consumers read a prepared dataset. Two kinds
// exist on disk:
//
//   physical  — a split dataset (dataset.json + modality dirs)
//   merged    — a merge.json index naming other datasets
//
// A merged view is resolved every time it is opened, so it
// always reflects the current contents of its sources.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::data::frames::FrameKind;
use crate::data::merge::{MergeIndex, MERGE_INDEX_FILE};
use crate::data::splitter::DATASET_META_FILE;
use crate::domain::error::{Result, SetupError};

/// One frame as seen by a consumer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetItem {
    /// Directory of the physical dataset holding the files
    pub dataset: PathBuf,
    /// `<section>_<frame>`, unique within `dataset`
    pub id:      String,
    /// modality dir name → file
    pub files:   BTreeMap<&'static str, PathBuf>,
}

impl DatasetItem {
    pub fn rgb(&self) -> Option<&Path> {
        self.files.get(FrameKind::Img.modality_dir()).map(PathBuf::as_path)
    }
}

#[derive(Debug, Clone)]
pub struct DatasetView {
    items: Vec<DatasetItem>,
}

impl DatasetView {
    /// Open a physical or merged dataset.
    pub fn open(path: &Path) -> Result<Self> {
        let mut visiting = HashSet::new();
        let items = resolve(path, &mut visiting)?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn resolve(path: &Path, visiting: &mut HashSet<PathBuf>) -> Result<Vec<DatasetItem>> {
    if path.join(MERGE_INDEX_FILE).is_file() {
        if !visiting.insert(path.to_path_buf()) {
            return Err(SetupError::config(format!(
                "merge index '{}' refers to itself",
                path.display()
            )));
        }
        let index = MergeIndex::load(path)?;
        let mut items = Vec::new();
        for source in index.resolved_sources(path) {
            items.extend(resolve(&source, visiting)?);
        }
        visiting.remove(path);
        return Ok(items);
    }

    if path.join(DATASET_META_FILE).is_file() {
        return physical_items(path);
    }

    Err(SetupError::config(format!("'{}' is not a dataset", path.display())))
}

/// Items of a split dataset, sorted by id. An item exists for
/// every file in `rgb/`.
fn physical_items(dataset: &Path) -> Result<Vec<DatasetItem>> {
    let mut by_id: BTreeMap<String, BTreeMap<&'static str, PathBuf>> = BTreeMap::new();

    for kind in FrameKind::ALL {
        let modality = kind.modality_dir();
        let dir = dataset.join(modality);
        if !dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
            by_id.entry(stem.to_string()).or_default().insert(modality, path.clone());
        }
    }

    let rgb = FrameKind::Img.modality_dir();
    Ok(by_id
        .into_iter()
        .filter(|(_, files)| files.contains_key(rgb))
        .map(|(id, files)| DatasetItem { dataset: dataset.to_path_buf(), id, files })
        .collect())
}
