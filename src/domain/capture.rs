// ============================================================
// Layer 3 — Capture Folder Roles and Pairs
// ============================================================
// The raw matching tree encodes two facts in each leaf folder
// name:
//   - the suffix says synthetic (`-sim`) or real (`-real`)
//   - the substring `outofplace` marks captures taken from
//     poses the synthetic model does not cover
//
// `classify` turns that naming convention into a FolderRole.
// Pairing synthetic folders with their real counterparts is a
// separate step (see data::discovery).

use std::path::{Path, PathBuf};

pub const SIM_SUFFIX: &str = "-sim";
pub const REAL_SUFFIX: &str = "-real";
pub const OUT_OF_PLACE_MARKER: &str = "outofplace";

/// What a leaf capture folder contains, decoded from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FolderRole {
    InPlaceSynthetic,
    InPlaceReal,
    OutOfPlaceSynthetic,
    OutOfPlaceReal,
}

impl FolderRole {
    pub fn is_synthetic(self) -> bool {
        matches!(self, FolderRole::InPlaceSynthetic | FolderRole::OutOfPlaceSynthetic)
    }

    pub fn is_out_of_place(self) -> bool {
        matches!(self, FolderRole::OutOfPlaceSynthetic | FolderRole::OutOfPlaceReal)
    }
}

/// Decode the role of a folder from its final path component.
/// Returns None for names that carry neither suffix.
pub fn classify(name: &str) -> Option<FolderRole> {
    let out_of_place = name.contains(OUT_OF_PLACE_MARKER);

    let role = if name.ends_with(SIM_SUFFIX) {
        if out_of_place { FolderRole::OutOfPlaceSynthetic } else { FolderRole::InPlaceSynthetic }
    } else if name.ends_with(REAL_SUFFIX) {
        if out_of_place { FolderRole::OutOfPlaceReal } else { FolderRole::InPlaceReal }
    } else {
        return None;
    };

    Some(role)
}

/// Expected path of the real capture matching a synthetic folder.
///
/// Only the suffix of the final component is substituted; the
/// parent path is kept as-is. Returns None when the path does not
/// end in `-sim`.
pub fn real_counterpart(sim_path: &Path) -> Option<PathBuf> {
    let name = sim_path.file_name()?.to_str()?;
    let stem = name.strip_suffix(SIM_SUFFIX)?;
    Some(sim_path.with_file_name(format!("{stem}{REAL_SUFFIX}")))
}

/// Joins the path components of a section name
pub const SECTION_SEPARATOR: &str = "__";

/// A synthetic capture folder and its verified real counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub synthetic: PathBuf,
    pub real:      PathBuf,
    /// Name of the processed section, unique under the matching root
    pub section:   String,
}

impl MatchedPair {
    pub fn new(
        synthetic: impl Into<PathBuf>,
        real:      impl Into<PathBuf>,
        section:   impl Into<String>,
    ) -> Self {
        Self { synthetic: synthetic.into(), real: real.into(), section: section.into() }
    }
}

/// Section name of a capture folder: its path below `root`, with
/// the components joined by `__`.
///
/// `matching/flight1/site-sim` → `flight1__site-sim`
pub fn section_name(root: &Path, folder: &Path) -> String {
    let rel = folder.strip_prefix(root).unwrap_or(folder);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join(SECTION_SEPARATOR)
}

/// Result of discovery: in-place and out-of-place pairs, each
/// sorted by the synthetic folder path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredPairs {
    pub in_place:     Vec<MatchedPair>,
    pub out_of_place: Vec<MatchedPair>,
}

impl DiscoveredPairs {
    pub fn len(&self) -> usize {
        self.in_place.len() + self.out_of_place.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
