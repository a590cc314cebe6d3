// ============================================================
// Layer 3 — Dataset Categories and Splits
// ============================================================
// Five fixed categories, each with its own staging directory:
//
//   lhs_sim         synthetic LHS renders, no real counterpart
//   drone_sim       synthetic renders of in-place drone flights
//   drone_real      real photos of in-place drone flights
//   oop_drone_sim   synthetic renders of out-of-place flights
//   oop_drone_real  real photos of out-of-place flights
//
// After splitting, `lhs_sim` becomes the `sim` family
// (train_sim, val_sim, test_sim); the others keep their label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LhsSim,
    DroneSim,
    DroneReal,
    OopDroneSim,
    OopDroneReal,
}

impl Category {
    /// Processing and splitting order
    pub const ALL: [Category; 5] = [
        Category::LhsSim,
        Category::DroneSim,
        Category::DroneReal,
        Category::OopDroneSim,
        Category::OopDroneReal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::LhsSim       => "lhs_sim",
            Category::DroneSim     => "drone_sim",
            Category::DroneReal    => "drone_real",
            Category::OopDroneSim  => "oop_drone_sim",
            Category::OopDroneReal => "oop_drone_real",
        }
    }

    /// Name of the split family, used as suffix of train_/val_/test_
    pub fn split_family(self) -> &'static str {
        match self {
            Category::LhsSim => "sim",
            other            => other.label(),
        }
    }

    pub fn staging_dir(self, dst_root: &Path) -> PathBuf {
        dst_root.join(self.label())
    }

    pub fn split_dir(self, dst_root: &Path, split: Split) -> PathBuf {
        dst_root.join(split.dir_name(self.split_family()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn prefix(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val   => "val",
            Split::Test  => "test",
        }
    }

    /// e.g. `train_drone_sim`
    pub fn dir_name(self, family: &str) -> String {
        format!("{}_{}", self.prefix(), family)
    }
}
