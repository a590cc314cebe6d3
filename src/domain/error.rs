// ============================================================
// Layer 3 — Setup Error Taxonomy
// ============================================================
// Every failure in a setup run is fatal. The variants only
// exist so the operator can tell WHICH kind of input to fix:
//
//   Config    — raw data tree does not follow the conventions
//               (missing folders, unpaired -sim folder, ...)
//   Transform — the geodetic reference could not be converted
//   Io/Image/Json — a collaborator failed while reading or
//               writing dataset files
//
// Reference: thiserror crate documentation

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing real counterpart '{real}' for synthetic folder '{sim}'")]
    MissingPair { sim: PathBuf, real: PathBuf },

    #[error("geodetic transform failed: {0}")]
    Transform(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl SetupError {
    /// Shorthand for building a `Config` error from any message
    pub fn config(msg: impl Into<String>) -> Self {
        SetupError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
