// ============================================================
// Layer 4 — Folder Discovery & Pairing
// ============================================================
// Walks the matching tree and returns every synthetic capture
// folder paired with its real counterpart:
//
//   1. visit every directory under the root
//   2. keep leaf capture folders (they directly hold files)
//   3. classify the final path component (domain::capture)
//   4. pair each synthetic folder with <name>-real next to it;
//      a missing real folder aborts the run
//   5. sort in-place and out-of-place pairs by synthetic path
//
// Real folders are never enumerated on their own; they are only
// reached through pairing.
//
// Reference: walkdir crate documentation

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::domain::capture::{classify, real_counterpart, section_name, DiscoveredPairs, MatchedPair};
use crate::domain::error::{Result, SetupError};

/// Discover and pair every synthetic leaf folder under `matching_root`.
pub fn discover_pairs(matching_root: &Path) -> Result<DiscoveredPairs> {
    let mut pairs = DiscoveredPairs::default();

    for entry in WalkDir::new(matching_root) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir = entry.path();
        let Some(name) = dir.file_name() else { continue };
        let Some(name) = name.to_str() else {
            // A synthetic folder skipped here would silently leave the dataset
            if classify(&name.to_string_lossy()).is_some_and(|r| r.is_synthetic()) {
                return Err(SetupError::config(format!(
                    "synthetic folder '{}' has a non UTF-8 name",
                    dir.display()
                )));
            }
            tracing::warn!("Skipping non UTF-8 directory '{}'", dir.display());
            continue;
        };
        let Some(role) = classify(name) else { continue };
        if !role.is_synthetic() || !holds_files(dir)? {
            continue;
        }

        let pair = pair_with_real(dir, section_name(matching_root, dir))?;
        tracing::debug!(
            "Paired '{}' ↔ '{}' ({:?})",
            pair.synthetic.display(),
            pair.real.display(),
            role
        );

        if role.is_out_of_place() {
            pairs.out_of_place.push(pair);
        } else {
            pairs.in_place.push(pair);
        }
    }

    // Filesystem enumeration order is not stable across machines
    sort_by_synthetic_path(&mut pairs.in_place);
    sort_by_synthetic_path(&mut pairs.out_of_place);
    require_unique_sections(&pairs.in_place)?;
    require_unique_sections(&pairs.out_of_place)?;

    tracing::info!(
        "Discovered {} in-place and {} out-of-place pairs under '{}'",
        pairs.in_place.len(),
        pairs.out_of_place.len(),
        matching_root.display()
    );

    Ok(pairs)
}

/// Build the pair for a synthetic folder, verifying the real one exists.
pub fn pair_with_real(sim_dir: &Path, section: String) -> Result<MatchedPair> {
    let real = real_counterpart(sim_dir).ok_or_else(|| {
        SetupError::config(format!("'{}' is not a synthetic folder", sim_dir.display()))
    })?;

    if !real.exists() {
        return Err(SetupError::MissingPair { sim: sim_dir.to_path_buf(), real });
    }

    Ok(MatchedPair::new(sim_dir, real, section))
}

/// True when `dir` directly contains at least one file (symlinks
/// to files count).
fn holds_files(dir: &Path) -> Result<bool> {
    for entry in fs::read_dir(dir)? {
        if entry?.path().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Sections of one category share a staging directory, so two
/// pairs mapping to the same name cannot both be processed.
fn require_unique_sections(pairs: &[MatchedPair]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for pair in pairs {
        if let Some(first) = seen.insert(pair.section.as_str(), pair.synthetic.as_path()) {
            return Err(SetupError::config(format!(
                "'{}' and '{}' both map to section '{}'",
                first.display(),
                pair.synthetic.display(),
                pair.section
            )));
        }
    }
    Ok(())
}

fn sort_by_synthetic_path(pairs: &mut [MatchedPair]) {
    pairs.sort_by(|a, b| a.synthetic.as_os_str().cmp(b.synthetic.as_os_str()));
}
