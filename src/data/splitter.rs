// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Partitions every frame staged for one category into three
// durable datasets next to the staging directory:
//
//   lhs_sim        → train_sim, val_sim, test_sim
//   drone_sim      → train_drone_sim, val_drone_sim, ...
//
// Why shuffle before splitting?
//   Sections are staged folder by folder, so frames from one
//   flight sit next to each other. Without shuffling, the
//   validation and test sets would each cover only the last
//   flights.
//
// The shuffle is seeded (SPLIT_SEED) and starts from a sorted
// item list, so the same staging content always produces the
// same split.
//
// Split ratio: 80% train, 10% validation, 10% test
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::frames::{extension_of, FrameKind};
use crate::domain::category::{Category, Split};
use crate::domain::error::{Result, SetupError};
use crate::domain::traits::DatasetSplitter;
use crate::infra::fs_ops::{move_file, recreate_dir, sorted_subdirs};

/// Seed of every randomized split
pub const SPLIT_SEED: u64 = 2021;

pub const VAL_FRACTION: f64 = 0.1;
pub const TEST_FRACTION: f64 = 0.1;

/// Metadata file present in every split dataset
pub const DATASET_META_FILE: &str = "dataset.json";

/// Describes one train_/val_/test_ dataset on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub benchmark:       String,
    pub category:        Category,
    pub split:           Split,
    pub ignore_3d_label: bool,
    pub items:           usize,
}

impl DatasetMeta {
    pub fn load(dataset_dir: &Path) -> Result<Self> {
        let path = dataset_dir.join(DATASET_META_FILE);
        let json = fs::read_to_string(&path).map_err(|e| {
            SetupError::config(format!("'{}' is not a split dataset: {}", dataset_dir.display(), e))
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, dataset_dir: &Path) -> Result<()> {
        fs::write(dataset_dir.join(DATASET_META_FILE), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Shuffle `samples` with `rng` and split into (train, val, test).
///
/// # Arguments
/// * `samples`       - All available samples (consumed by this function)
/// * `val_fraction`  - Proportion for validation, e.g. 0.1 = 10%
/// * `test_fraction` - Proportion for testing
///
/// Validation and test sizes are rounded; training takes the rest.
pub fn split_train_val_test<T, R: Rng + ?Sized>(
    mut samples:   Vec<T>,
    val_fraction:  f64,
    test_fraction: f64,
    rng:           &mut R,
) -> (Vec<T>, Vec<T>, Vec<T>) {
    // Fisher-Yates shuffle — every permutation is equally likely
    samples.shuffle(rng);

    let total  = samples.len();
    let n_val  = ((total as f64) * val_fraction).round() as usize;
    let n_test = ((total as f64) * test_fraction).round() as usize;

    // Clamp to valid range to avoid panics on tiny datasets
    let n_test = n_test.min(total);
    let n_val  = n_val.min(total - n_test);

    // After this: samples = train, val, test in that order
    let test = samples.split_off(total - n_test);
    let val  = samples.split_off(samples.len() - n_val);

    tracing::debug!(
        "Dataset split: {} train, {} validation, {} test",
        samples.len(),
        val.len(),
        test.len(),
    );

    (samples, val, test)
}

/// One staged frame: its section and every modality file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StagedItem {
    section:  String,
    frame_id: String,
    files:    Vec<(&'static str, PathBuf)>,
}

impl StagedItem {
    fn item_id(&self) -> String {
        format!("{}_{}", self.section, self.frame_id)
    }
}

/// Collect staged frames in (section, frame) order.
fn collect_items(staging_dir: &Path) -> Result<Vec<StagedItem>> {
    let mut items = Vec::new();

    for section_dir in sorted_subdirs(staging_dir)? {
        let section = section_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // frame id → modality files
        let mut frames: BTreeMap<String, Vec<(&'static str, PathBuf)>> = BTreeMap::new();
        for kind in FrameKind::ALL {
            let modality = kind.modality_dir();
            let dir = section_dir.join(modality);
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
                frames.entry(stem.to_string()).or_default().push((modality, path.clone()));
            }
        }

        for (frame_id, files) in frames {
            items.push(StagedItem { section: section.clone(), frame_id, files });
        }
    }

    Ok(items)
}

/// Item ids flatten (section, frame) into one file name, so two
/// different frames could end up with the same id. Moving both
/// would silently overwrite one of them.
fn require_unique_ids(items: &[StagedItem]) -> Result<()> {
    let mut seen: HashMap<String, &StagedItem> = HashMap::new();
    for item in items {
        if let Some(first) = seen.insert(item.item_id(), item) {
            return Err(SetupError::config(format!(
                "frame '{}' of section '{}' and frame '{}' of section '{}' share the item id '{}'",
                first.frame_id,
                first.section,
                item.frame_id,
                item.section,
                item.item_id()
            )));
        }
    }
    Ok(())
}

/// Default splitter: seeded 80/10/10 split, files moved into place.
#[derive(Debug, Clone, Copy)]
pub struct RandomSplitter {
    seed: u64,
}

impl RandomSplitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomSplitter {
    fn default() -> Self {
        Self::new(SPLIT_SEED)
    }
}

impl DatasetSplitter for RandomSplitter {
    fn split(
        &self,
        staging_dir:     &Path,
        category:        Category,
        benchmark:       &str,
        ignore_3d_label: bool,
    ) -> Result<()> {
        let dst_root = staging_dir.parent().ok_or_else(|| {
            SetupError::config(format!("staging dir '{}' has no parent", staging_dir.display()))
        })?;

        let items = collect_items(staging_dir)?;
        require_unique_ids(&items)?;
        let total = items.len();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let (train, val, test) = split_train_val_test(items, VAL_FRACTION, TEST_FRACTION, &mut rng);

        for (split, subset) in [(Split::Train, train), (Split::Val, val), (Split::Test, test)] {
            let split_dir = category.split_dir(dst_root, split);
            recreate_dir(&split_dir)?;

            for item in &subset {
                let item_id = item.item_id();
                for (modality, src) in &item.files {
                    let dst = split_dir
                        .join(modality)
                        .join(format!("{}.{}", item_id, extension_of(src)));
                    move_file(src, &dst)?;
                }
            }

            DatasetMeta {
                benchmark:       benchmark.to_string(),
                category,
                split,
                ignore_3d_label,
                items:           subset.len(),
            }
            .save(&split_dir)?;
        }

        tracing::info!("Split {} frames of '{}'", total, category);
        Ok(())
    }
}
