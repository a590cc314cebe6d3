// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Flags of the single `urbanscape-setup` entry point. Long
// names keep the snake_case spelling operators already use
// (`--dataset_dir`, `--ignore_3d_label`, ...).

use clap::Args;
use std::path::PathBuf;

use crate::application::setup_use_case::SetupConfig;
use crate::domain::origin::GeodeticReference;
use crate::domain::traits::ProcessOptions;

#[derive(Args, Debug, Clone)]
pub struct SetupArgs {
    /// Directory holding the raw source datasets
    #[arg(long = "dataset_dir")]
    pub dataset_dir: PathBuf,

    /// Synthetic LHS source, relative to --dataset_dir
    #[arg(long = "lhs_dir", default_value = "urbanscape-LHS")]
    pub lhs_dir: PathBuf,

    /// Real-synthetic matching source, relative to --dataset_dir
    #[arg(long = "matching_dir", default_value = "matching/")]
    pub matching_dir: PathBuf,

    /// Destination of the organized dataset (DSAC* convention)
    #[arg(long = "output_dir", default_value = "urbanscape")]
    pub output_dir: PathBuf,

    /// Downsampling rate of 3D labels. Does not apply to semantics!
    #[arg(long, default_value_t = 8)]
    pub stride: usize,

    /// Forcefully downsample semantic maps with --stride too
    #[arg(long = "force_semantics_downsampling")]
    pub force_semantics_downsampling: bool,

    /// Save RGB and semantic maps only, ignore all 3D labels
    #[arg(long = "ignore_3d_label")]
    pub ignore_3d_label: bool,

    /// Benchmark name recorded in dataset metadata
    #[arg(long, default_value = "urbanscape")]
    pub benchmark: String,

    /// Longitude of the coordinate origin, degrees
    #[arg(long = "origin_lon", default_value_t = GeodeticReference::URBANSCAPE.longitude_deg)]
    pub origin_lon: f64,

    /// Latitude of the coordinate origin, degrees
    #[arg(long = "origin_lat", default_value_t = GeodeticReference::URBANSCAPE.latitude_deg)]
    pub origin_lat: f64,

    /// Ellipsoidal height of the coordinate origin, metres
    #[arg(long = "origin_alt", default_value_t = GeodeticReference::URBANSCAPE.altitude_m)]
    pub origin_alt: f64,

    /// Frame processing threads (0 = one per core)
    #[arg(long, default_value_t = 0)]
    pub workers: usize,
}

/// Boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<SetupArgs> for SetupConfig {
    fn from(a: SetupArgs) -> Self {
        SetupConfig {
            dataset_dir:  a.dataset_dir,
            lhs_dir:      a.lhs_dir,
            matching_dir: a.matching_dir,
            output_dir:   a.output_dir,
            benchmark:    a.benchmark,
            reference:    GeodeticReference::new(a.origin_lon, a.origin_lat, a.origin_alt),
            options:      ProcessOptions {
                stride:                       a.stride,
                ignore_3d_label:              a.ignore_3d_label,
                force_semantics_downsampling: a.force_semantics_downsampling,
            },
            workers:      a.workers,
        }
    }
}
