// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands a SetupConfig to
// Layer 2. The frame worker pool is configured here, before
// any other work starts, since rayon's global pool can only be
// built once per process.

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::SetupArgs;

use crate::application::setup_use_case::{SetupConfig, SetupUseCase};

#[derive(Parser, Debug)]
#[command(
    name = "urbanscape-setup",
    version,
    about = "Setup the Urbanscape geolocalization benchmark dataset."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: SetupArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config: SetupConfig = self.args.into();
        tracing::info!("{:?}", config);

        configure_workers(config.workers)?;

        let report = SetupUseCase::new(config).execute()?;
        println!(
            "Dataset setup complete: {} datasets written.",
            report.rows().len()
        );
        Ok(())
    }
}

/// Size the global rayon pool. 0 keeps rayon's default.
fn configure_workers(workers: usize) -> Result<()> {
    if workers == 0 {
        return Ok(());
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .context("Cannot configure the frame worker pool")?;
    tracing::debug!("Frame worker pool: {} threads", workers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["urbanscape-setup", "--dataset_dir", "/raw"]).unwrap();
        let cfg: SetupConfig = cli.args.into();

        assert_eq!(cfg.lhs_path(), PathBuf::from("/raw/urbanscape-LHS"));
        assert_eq!(cfg.matching_path(), PathBuf::from("/raw/matching/"));
        assert_eq!(cfg.output_dir, PathBuf::from("urbanscape"));
        assert_eq!(cfg.options.stride, 8);
        assert!(!cfg.options.ignore_3d_label);
        assert!(!cfg.options.force_semantics_downsampling);
        assert_eq!(cfg.reference, crate::domain::origin::GeodeticReference::URBANSCAPE);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "urbanscape-setup",
            "--dataset_dir", "/raw",
            "--stride", "4",
            "--ignore_3d_label",
            "--force_semantics_downsampling",
            "--output_dir", "/out",
        ])
        .unwrap();
        let cfg: SetupConfig = cli.args.into();

        assert_eq!(cfg.options.stride, 4);
        assert!(cfg.options.ignore_3d_label);
        assert!(cfg.options.force_semantics_downsampling);
        assert_eq!(cfg.output_dir, PathBuf::from("/out"));
    }

    #[test]
    fn test_dataset_dir_is_required() {
        assert!(Cli::try_parse_from(["urbanscape-setup"]).is_err());
    }
}
