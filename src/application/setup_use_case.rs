// ============================================================
// Layer 2 — SetupUseCase
// ============================================================
// Orchestrates the full dataset assembly in a fixed order:
//
//   Step 1: Resolve the ECEF origin           (Layer 5 - infra)
//   Step 2: Check the raw source directories
//   Step 3: Create the output directory, save config
//   Step 4: Discover sim/real pairs           (Layer 4 - data)
//   Step 5: Process the LHS folder            → lhs_sim
//   Step 6: Process in-place pairs            → drone_sim, drone_real
//   Step 7: Process out-of-place pairs        → oop_drone_sim, oop_drone_real
//   Step 8: Split every category, drop its staging directory
//   Step 9: Build the two virtual training merges
//
// A category is only split once every folder feeding it has
// been processed, and the merges need the training splits of
// step 8. Any error aborts the run; staging directories are
// removed on the way out, durable splits already written stay.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    discovery::discover_pairs,
    merge::merge,
    processor::FrameSectionProcessor,
    splitter::RandomSplitter,
    view::DatasetView,
};
use crate::domain::{
    category::{Category, Split},
    error::SetupError,
    origin::{GeodeticReference, Origin},
    traits::{DatasetSplitter, ProcessOptions, ProcessRequest, SectionProcessor},
};
use crate::infra::{
    config_store::ConfigStore,
    fs_ops::ensure_dir,
    geodesy::resolve_origin,
    report::SetupReport,
    staging::StagingDir,
};

/// Virtual training merges built at the end of a run:
/// (first source, second source, destination name)
pub const TRAIN_MERGES: [(Category, Category, &str); 2] = [
    (Category::LhsSim, Category::DroneSim,    "train_sim_plus_drone_sim"),
    (Category::LhsSim, Category::OopDroneSim, "train_sim_plus_oop_drone_sim"),
];

// ─── Setup Configuration ─────────────────────────────────────────────────────
// Every parameter of a run. Saved as setup_config.json in the
// output directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupConfig {
    pub dataset_dir:  PathBuf,
    /// Relative to `dataset_dir` (absolute paths are kept as-is)
    pub lhs_dir:      PathBuf,
    /// Relative to `dataset_dir` (absolute paths are kept as-is)
    pub matching_dir: PathBuf,
    pub output_dir:   PathBuf,
    pub benchmark:    String,
    pub reference:    GeodeticReference,
    pub options:      ProcessOptions,
    /// Frame workers, 0 = one per core
    pub workers:      usize,
}

impl SetupConfig {
    /// Defaults for a raw dataset living in `dataset_dir`
    pub fn new(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir:  dataset_dir.into(),
            lhs_dir:      PathBuf::from("urbanscape-LHS"),
            matching_dir: PathBuf::from("matching"),
            output_dir:   PathBuf::from("urbanscape"),
            benchmark:    "urbanscape".to_string(),
            reference:    GeodeticReference::URBANSCAPE,
            options:      ProcessOptions::default(),
            workers:      0,
        }
    }

    pub fn lhs_path(&self) -> PathBuf {
        self.dataset_dir.join(&self.lhs_dir)
    }

    pub fn matching_path(&self) -> PathBuf {
        self.dataset_dir.join(&self.matching_dir)
    }
}

// ─── SetupUseCase ─────────────────────────────────────────────────────────────
pub struct SetupUseCase<P = FrameSectionProcessor, S = RandomSplitter> {
    config:    SetupConfig,
    processor: P,
    splitter:  S,
}

impl SetupUseCase {
    /// Use case with the default processor and seeded splitter
    pub fn new(config: SetupConfig) -> Self {
        Self::with_collaborators(config, FrameSectionProcessor::new(), RandomSplitter::default())
    }
}

impl<P: SectionProcessor, S: DatasetSplitter> SetupUseCase<P, S> {
    pub fn with_collaborators(config: SetupConfig, processor: P, splitter: S) -> Self {
        Self { config, processor, splitter }
    }

    /// Run the whole pipeline and return the per-dataset summary
    pub fn execute(&self) -> Result<SetupReport> {
        let cfg = &self.config;
        tracing::info!("===== {} dataset setup starts =====", cfg.benchmark);

        // ── Step 1: Origin, before touching the filesystem ───────────────────
        let origin = resolve_origin(&cfg.reference).context("Cannot resolve the ECEF origin")?;

        // ── Step 2: Raw source directories must exist ────────────────────────
        let lhs_dir      = cfg.lhs_path();
        let matching_dir = cfg.matching_path();
        require_dir(&lhs_dir, "LHS source")?;
        require_dir(&matching_dir, "matching data")?;

        // The LHS section keeps the folder's own name
        let lhs_section = lhs_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| SetupError::config(format!("'{}' has no folder name", lhs_dir.display())))?;

        // ── Step 3: Output directory and config audit trail ──────────────────
        let dst = cfg.output_dir.as_path();
        ensure_dir(dst).with_context(|| format!("Cannot create '{}'", dst.display()))?;
        ConfigStore::new(dst).save(cfg)?;

        // ── Step 4: Discover sim/real pairs ──────────────────────────────────
        let pairs = discover_pairs(&matching_dir)?;

        // Staging directories live until their category is split
        let staging = Category::ALL
            .iter()
            .map(|&c| StagingDir::acquire(dst, c))
            .collect::<Result<Vec<_>, _>>()?;

        // ── Step 5: LHS synthetic data ───────────────────────────────────────
        self.process(&lhs_dir, None, &lhs_section, Category::LhsSim, &origin)?;

        // ── Step 6: In-place drone matching data ─────────────────────────────
        for pair in &pairs.in_place {
            self.process(&pair.synthetic, None, &pair.section, Category::DroneSim, &origin)?;
            self.process(&pair.synthetic, Some(&pair.real), &pair.section, Category::DroneReal, &origin)?;
        }

        // ── Step 7: Out-of-place drone matching data ─────────────────────────
        for pair in &pairs.out_of_place {
            self.process(&pair.synthetic, None, &pair.section, Category::OopDroneSim, &origin)?;
            self.process(&pair.synthetic, Some(&pair.real), &pair.section, Category::OopDroneReal, &origin)?;
        }

        // ── Step 8: Split, then drop staging ─────────────────────────────────
        for dir in staging {
            let category = dir.category();
            tracing::info!("===== Splitting data in {} mode =====", category);
            self.splitter
                .split(dir.path(), category, &cfg.benchmark, cfg.options.ignore_3d_label)
                .with_context(|| format!("Splitting '{}' failed", category))?;
            dir.finish()?;
        }

        // ── Step 9: Virtual merges of the training splits ────────────────────
        for (a, b, name) in TRAIN_MERGES {
            let sources = [a.split_dir(dst, Split::Train), b.split_dir(dst, Split::Train)];
            merge(&sources, &dst.join(name))
                .with_context(|| format!("Cannot build virtual dataset '{}'", name))?;
        }

        let report = summarize(dst)?;
        report.write_csv(dst)?;

        tracing::info!("===== {} dataset setup is done =====", cfg.benchmark);
        Ok(report)
    }

    fn process(
        &self,
        source:      &Path,
        paired_real: Option<&Path>,
        section:     &str,
        category:    Category,
        origin:      &Origin,
    ) -> Result<()> {
        let cfg = &self.config;
        self.processor
            .process(&ProcessRequest {
                source,
                paired_real,
                section,
                dst_root: &cfg.output_dir,
                category,
                origin,
                options: &cfg.options,
            })
            .with_context(|| format!("Processing '{}' into {} failed", source.display(), category))
    }
}

fn require_dir(path: &Path, what: &str) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    Err(SetupError::config(format!("{} directory '{}' does not exist", what, path.display())).into())
}

/// Count the items of every durable dataset and merged view
fn summarize(dst: &Path) -> Result<SetupReport> {
    let mut report = SetupReport::new();
    for category in Category::ALL {
        for split in Split::ALL {
            let dir = category.split_dir(dst, split);
            report.record(split.dir_name(category.split_family()), DatasetView::open(&dir)?.len());
        }
    }
    for (_, _, name) in TRAIN_MERGES {
        report.record(name, DatasetView::open(&dst.join(name))?.len());
    }
    Ok(report)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::Result as SetupResult;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    /// Write `n` complete frames into a synthetic capture folder
    fn sim_frames(dir: &Path, n: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..n {
            fs::write(dir.join(format!("{i:04}_img.png")), b"rgb").unwrap();
            fs::write(dir.join(format!("{i:04}_semantics.png")), b"sem").unwrap();
            fs::write(dir.join(format!("{i:04}_pose.txt")), "4368100 502900 4605500 0 0 0 1").unwrap();
        }
    }

    fn real_frames(dir: &Path, n: usize) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..n {
            fs::write(dir.join(format!("{i:04}_img.jpg")), b"photo").unwrap();
        }
    }

    /// Raw tree: 10 LHS frames, one in-place pair, one out-of-place pair
    fn raw_dataset(root: &Path) -> SetupConfig {
        let raw = root.join("raw");
        sim_frames(&raw.join("urbanscape-LHS"), 10);
        sim_frames(&raw.join("matching/site1-sim"), 5);
        real_frames(&raw.join("matching/site1-real"), 5);
        sim_frames(&raw.join("matching/site2-outofplace-sim"), 4);
        real_frames(&raw.join("matching/site2-outofplace-real"), 4);

        let mut cfg = SetupConfig::new(raw);
        cfg.output_dir = root.join("urbanscape");
        cfg
    }

    /// Splitter wrapper recording which staging dirs were populated
    struct RecordingSplitter {
        inner:     RandomSplitter,
        populated: RefCell<Vec<(Category, usize)>>,
    }

    impl DatasetSplitter for RecordingSplitter {
        fn split(&self, staging: &Path, category: Category, benchmark: &str, ignore: bool) -> SetupResult<()> {
            let sections = fs::read_dir(staging)?.count();
            self.populated.borrow_mut().push((category, sections));
            self.inner.split(staging, category, benchmark, ignore)
        }
    }

    /// Processor that fails on out-of-place folders
    struct FailingOnOutOfPlace;

    impl SectionProcessor for FailingOnOutOfPlace {
        fn process(&self, req: &ProcessRequest<'_>) -> SetupResult<()> {
            if req.category == Category::OopDroneSim {
                return Err(SetupError::config("simulated processor failure"));
            }
            FrameSectionProcessor::new().process(req)
        }
    }

    #[test]
    fn test_end_to_end_layout() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let dst = cfg.output_dir.clone();

        let report = SetupUseCase::new(cfg).execute().unwrap();

        for category in Category::ALL {
            assert!(!category.staging_dir(&dst).exists(), "{category} staging left behind");
            for split in Split::ALL {
                assert!(category.split_dir(&dst, split).join("dataset.json").exists());
            }
        }
        assert!(dst.join("setup_config.json").exists());
        assert!(dst.join("setup_summary.csv").exists());

        // 10 LHS frames → 8/1/1, 5 drone frames → 3/1/1 (round(0.5) = 1)
        let rows: Vec<_> = report.rows().iter().map(|r| (r.dataset.as_str(), r.items)).collect();
        assert!(rows.contains(&("train_sim", 8)));
        assert!(rows.contains(&("train_drone_sim", 3)));
        assert!(rows.contains(&("train_sim_plus_drone_sim", 11)));
    }

    #[test]
    fn test_split_order_and_populated_staging() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let use_case = SetupUseCase::with_collaborators(
            cfg,
            FrameSectionProcessor::new(),
            RecordingSplitter { inner: RandomSplitter::default(), populated: RefCell::new(Vec::new()) },
        );

        use_case.execute().unwrap();

        let populated = use_case.splitter.populated.borrow().clone();
        assert_eq!(
            populated,
            vec![
                (Category::LhsSim, 1),
                (Category::DroneSim, 1),
                (Category::DroneReal, 1),
                (Category::OopDroneSim, 1),
                (Category::OopDroneReal, 1),
            ]
        );
    }

    #[test]
    fn test_merges_reference_all_training_items() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let dst = cfg.output_dir.clone();
        SetupUseCase::new(cfg).execute().unwrap();

        let ids = |path: PathBuf| -> BTreeSet<PathBuf> {
            DatasetView::open(&path)
                .unwrap()
                .items()
                .iter()
                .filter_map(|i| i.rgb().map(Path::to_path_buf))
                .collect()
        };

        let sim       = ids(dst.join("train_sim"));
        let drone     = ids(dst.join("train_drone_sim"));
        let oop_drone = ids(dst.join("train_oop_drone_sim"));

        let expected: BTreeSet<_> = sim.union(&drone).cloned().collect();
        assert_eq!(ids(dst.join("train_sim_plus_drone_sim")), expected);

        let expected: BTreeSet<_> = sim.union(&oop_drone).cloned().collect();
        assert_eq!(ids(dst.join("train_sim_plus_oop_drone_sim")), expected);
    }

    #[test]
    fn test_drone_real_uses_real_photos() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let dst = cfg.output_dir.clone();
        SetupUseCase::new(cfg).execute().unwrap();

        let view = DatasetView::open(&dst.join("train_drone_real")).unwrap();
        assert!(!view.is_empty());
        for item in view.items() {
            assert_eq!(fs::read(item.rgb().unwrap()).unwrap(), b"photo");
        }
    }

    #[test]
    fn test_same_named_leaves_in_different_parents() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let matching = cfg.matching_path();
        for flight in ["flight1", "flight2"] {
            sim_frames(&matching.join(flight).join("site-sim"), 5);
            real_frames(&matching.join(flight).join("site-real"), 5);
        }
        let dst = cfg.output_dir.clone();

        let report = SetupUseCase::new(cfg).execute().unwrap();

        // three in-place pairs of 5 frames each → 11/2/2
        let rows: Vec<_> = report.rows().iter().map(|r| (r.dataset.as_str(), r.items)).collect();
        assert!(rows.contains(&("train_drone_sim", 11)));
        let ids: Vec<_> = DatasetView::open(&dst.join("test_drone_real"))
            .unwrap()
            .items()
            .iter()
            .map(|i| i.id.clone())
            .collect();
        assert_eq!(ids.len(), 2);

        let all: usize = Split::ALL
            .iter()
            .map(|&s| DatasetView::open(&Category::DroneSim.split_dir(&dst, s)).unwrap().len())
            .sum();
        assert_eq!(all, 15);
    }

    #[test]
    fn test_missing_lhs_dir_is_fatal_before_output() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = raw_dataset(tmp.path());
        cfg.lhs_dir = PathBuf::from("does-not-exist");
        let dst = cfg.output_dir.clone();

        assert!(SetupUseCase::new(cfg).execute().is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_bad_reference_fails_before_any_mutation() {
        let tmp = TempDir::new().unwrap();
        let mut cfg = raw_dataset(tmp.path());
        cfg.reference = GeodeticReference::new(0.0, 123.0, 0.0);
        let dst = cfg.output_dir.clone();

        assert!(SetupUseCase::new(cfg).execute().is_err());
        assert!(!dst.exists());
    }

    #[test]
    fn test_missing_real_pair_aborts_run() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        sim_frames(&cfg.matching_path().join("site3-sim"), 2);

        let err = SetupUseCase::new(cfg).execute().unwrap_err();
        let setup_err = err.downcast_ref::<SetupError>().unwrap();
        assert!(matches!(setup_err, SetupError::MissingPair { .. }));
    }

    #[test]
    fn test_processor_failure_cleans_staging() {
        let tmp = TempDir::new().unwrap();
        let cfg = raw_dataset(tmp.path());
        let dst = cfg.output_dir.clone();

        let res = SetupUseCase::with_collaborators(cfg, FailingOnOutOfPlace, RandomSplitter::default()).execute();
        assert!(res.is_err());

        for category in Category::ALL {
            assert!(!category.staging_dir(&dst).exists(), "{category} staging left behind");
        }
        // nothing was split yet
        assert!(!dst.join("train_sim").exists());
    }
}
