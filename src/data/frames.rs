// ============================================================
// Layer 4 — Frame File Layout
// ============================================================
// Inside a leaf capture folder every frame is a group of files
// sharing a frame id:
//
//   0042_img.png        RGB image
//   0042_semantics.png  semantic map
//   0042_pose.txt       ECEF camera position "x y z" followed by
//                       optional orientation numbers
//   0042_depth.png      16-bit depth map (optional)
//
// Processed sections and split datasets store the same frame as
//   rgb/0042.png, semantics/0042.png, poses/0042.txt, depth/0042.png

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FrameKind {
    Img,
    Semantics,
    Pose,
    Depth,
}

impl FrameKind {
    pub const ALL: [FrameKind; 4] = [
        FrameKind::Img,
        FrameKind::Semantics,
        FrameKind::Pose,
        FrameKind::Depth,
    ];

    /// Token after the last underscore in a raw file name
    pub fn token(self) -> &'static str {
        match self {
            FrameKind::Img       => "img",
            FrameKind::Semantics => "semantics",
            FrameKind::Pose      => "pose",
            FrameKind::Depth     => "depth",
        }
    }

    /// Directory holding this kind in processed output
    pub fn modality_dir(self) -> &'static str {
        match self {
            FrameKind::Img       => "rgb",
            FrameKind::Semantics => "semantics",
            FrameKind::Pose      => "poses",
            FrameKind::Depth     => "depth",
        }
    }

    pub fn is_3d_label(self) -> bool {
        matches!(self, FrameKind::Pose | FrameKind::Depth)
    }

    fn from_token(token: &str) -> Option<Self> {
        FrameKind::ALL.into_iter().find(|k| k.token() == token)
    }
}

/// Split `<frame_id>_<kind>.<ext>` into its parts.
pub fn parse_frame_file(name: &str) -> Option<(String, FrameKind)> {
    let (stem, _ext) = name.rsplit_once('.')?;
    let (frame_id, token) = stem.rsplit_once('_')?;
    if frame_id.is_empty() {
        return None;
    }
    Some((frame_id.to_string(), FrameKind::from_token(token)?))
}

/// All files belonging to one frame id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameFiles {
    files: BTreeMap<FrameKind, PathBuf>,
}

impl FrameFiles {
    pub fn get(&self, kind: FrameKind) -> Option<&Path> {
        self.files.get(&kind).map(PathBuf::as_path)
    }

    pub fn has(&self, kind: FrameKind) -> bool {
        self.files.contains_key(&kind)
    }
}

/// Group the files of a capture folder by frame id, sorted by id.
/// Files that do not follow the naming convention are skipped.
pub fn index_frames(dir: &Path) -> Result<BTreeMap<String, FrameFiles>> {
    let mut frames: BTreeMap<String, FrameFiles> = BTreeMap::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Follows symlinks, raw captures are often linked in
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some((frame_id, kind)) = name.to_str().and_then(parse_frame_file) else {
            tracing::debug!("Ignoring '{}'", entry.path().display());
            continue;
        };
        frames.entry(frame_id).or_default().files.insert(kind, entry.path());
    }

    Ok(frames)
}

/// Extension of a path, or an empty string
pub fn extension_of(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}
