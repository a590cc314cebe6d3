// ============================================================
// Layer 4 — Frame Section Processor
// ============================================================
// Default SectionProcessor. Turns one capture folder into a
// processed section:
//
//   <dst>/<category>/<section>/
//       rgb/        copied from the RGB source
//       semantics/  copied, or downsampled when forced
//       poses/      position re-expressed relative to Origin
//       depth/      downsampled by `stride`
//       section.json
//
// The RGB source is the real folder when one is paired, the
// synthetic folder otherwise. Labels always come from the
// synthetic folder, so a real photo is labelled with the
// geometry of its synthetic twin.
//
// Frames are independent and their output paths are disjoint,
// so they are processed on the rayon pool.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, Pixel};
use nalgebra::Vector3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::frames::{extension_of, index_frames, FrameFiles, FrameKind};
use crate::domain::category::Category;
use crate::domain::error::{Result, SetupError};
use crate::domain::origin::Origin;
use crate::domain::traits::{ProcessOptions, ProcessRequest, SectionProcessor};

pub const SECTION_META_FILE: &str = "section.json";

/// Provenance written next to every processed section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMeta {
    pub category:    Category,
    pub synthetic:   PathBuf,
    pub real:        Option<PathBuf>,
    pub options:     ProcessOptions,
    pub frame_count: usize,
}

/// One frame to write: where its RGB comes from and which label
/// files belong to it.
struct FrameJob<'a> {
    frame_id: &'a str,
    rgb:      &'a Path,
    labels:   &'a FrameFiles,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameSectionProcessor;

impl FrameSectionProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl SectionProcessor for FrameSectionProcessor {
    fn process(&self, req: &ProcessRequest<'_>) -> Result<()> {
        let opts   = req.options;
        let stride = checked_stride(opts.stride)?;

        let section = req.section;
        if section.is_empty() || section.contains(['/', '\\']) || section == "." || section == ".." {
            return Err(SetupError::config(format!("invalid section name '{section}'")));
        }
        let section_dir = req.category.staging_dir(req.dst_root).join(section);
        if section_dir.exists() {
            return Err(SetupError::config(format!(
                "section '{}' already exists; two sources share a section name",
                section_dir.display()
            )));
        }

        tracing::info!(
            "Processing '{}'{} → {}",
            req.source.display(),
            req.paired_real.map(|r| format!(" + '{}'", r.display())).unwrap_or_default(),
            req.category
        );

        let labels = index_frames(req.source)?;
        let rgb_frames = match req.paired_real {
            Some(real) => index_frames(real)?,
            None       => labels.clone(),
        };

        let mut jobs = Vec::new();
        for (frame_id, files) in &rgb_frames {
            let Some(rgb) = files.get(FrameKind::Img) else { continue };
            let frame_labels = labels.get(frame_id).ok_or_else(|| {
                SetupError::config(format!(
                    "frame '{}' of '{}' has no synthetic labels in '{}'",
                    frame_id,
                    rgb.display(),
                    req.source.display()
                ))
            })?;
            require_label(frame_labels, FrameKind::Semantics, frame_id, req.source)?;
            if !opts.ignore_3d_label {
                require_label(frame_labels, FrameKind::Pose, frame_id, req.source)?;
            }
            jobs.push(FrameJob { frame_id, rgb, labels: frame_labels });
        }

        for kind in FrameKind::ALL {
            if opts.ignore_3d_label && kind.is_3d_label() {
                continue;
            }
            fs::create_dir_all(section_dir.join(kind.modality_dir()))?;
        }

        jobs.par_iter()
            .try_for_each(|job| write_frame(job, &section_dir, req.origin, opts, stride))?;

        let meta = SectionMeta {
            category:    req.category,
            synthetic:   req.source.to_path_buf(),
            real:        req.paired_real.map(Path::to_path_buf),
            options:     *opts,
            frame_count: jobs.len(),
        };
        fs::write(section_dir.join(SECTION_META_FILE), serde_json::to_string_pretty(&meta)?)?;

        tracing::debug!("Wrote {} frames to '{}'", jobs.len(), section_dir.display());
        Ok(())
    }
}

fn checked_stride(stride: usize) -> Result<u32> {
    match u32::try_from(stride) {
        Ok(s) if s >= 1 => Ok(s),
        _ => Err(SetupError::config(format!("stride must be a positive integer, got {stride}"))),
    }
}

fn require_label(files: &FrameFiles, kind: FrameKind, frame_id: &str, dir: &Path) -> Result<()> {
    if files.has(kind) {
        return Ok(());
    }
    Err(SetupError::config(format!(
        "frame '{}' in '{}' is missing its {} file",
        frame_id,
        dir.display(),
        kind.token()
    )))
}

fn write_frame(
    job:     &FrameJob<'_>,
    section: &Path,
    origin:  &Origin,
    opts:    &ProcessOptions,
    stride:  u32,
) -> Result<()> {
    let out = |kind: FrameKind, ext: &str| {
        section.join(kind.modality_dir()).join(format!("{}.{}", job.frame_id, ext))
    };

    fs::copy(job.rgb, out(FrameKind::Img, extension_of(job.rgb)))?;

    if let Some(sem) = job.labels.get(FrameKind::Semantics) {
        if opts.force_semantics_downsampling {
            downsample_image_file(sem, &out(FrameKind::Semantics, "png"), stride)?;
        } else {
            fs::copy(sem, out(FrameKind::Semantics, extension_of(sem)))?;
        }
    }

    if opts.ignore_3d_label {
        return Ok(());
    }

    if let Some(pose) = job.labels.get(FrameKind::Pose) {
        let text = fs::read_to_string(pose)?;
        let rel  = recenter_pose(&text, origin)
            .map_err(|msg| SetupError::config(format!("bad pose file '{}': {}", pose.display(), msg)))?;
        fs::write(out(FrameKind::Pose, "txt"), rel)?;
    }

    if let Some(depth) = job.labels.get(FrameKind::Depth) {
        downsample_image_file(depth, &out(FrameKind::Depth, "png"), stride)?;
    }

    Ok(())
}

/// Rewrite a pose line so its leading ECEF position is relative to
/// `origin`. Trailing numbers (orientation) are kept verbatim.
pub fn recenter_pose(text: &str, origin: &Origin) -> std::result::Result<String, String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(format!("expected at least 3 numbers, found {}", tokens.len()));
    }

    let mut xyz = [0.0f64; 3];
    for (slot, tok) in xyz.iter_mut().zip(&tokens[..3]) {
        *slot = tok.parse().map_err(|_| format!("'{tok}' is not a number"))?;
    }
    for tok in &tokens[3..] {
        tok.parse::<f64>().map_err(|_| format!("'{tok}' is not a number"))?;
    }

    let rel = origin.relative(&Vector3::new(xyz[0], xyz[1], xyz[2]));
    let mut out = format!("{} {} {}", rel.x, rel.y, rel.z);
    for tok in &tokens[3..] {
        out.push(' ');
        out.push_str(tok);
    }
    out.push('\n');
    Ok(out)
}

/// Keep every `stride`-th pixel along both axes.
pub fn downsample_nearest<P: Pixel>(
    img:    &ImageBuffer<P, Vec<P::Subpixel>>,
    stride: u32,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (w, h) = img.dimensions();
    ImageBuffer::from_fn(w.div_ceil(stride), h.div_ceil(stride), |x, y| {
        *img.get_pixel(x * stride, y * stride)
    })
}

fn downsample_dynamic(img: DynamicImage, stride: u32) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(b)  => DynamicImage::ImageLuma8(downsample_nearest(&b, stride)),
        DynamicImage::ImageLuma16(b) => DynamicImage::ImageLuma16(downsample_nearest(&b, stride)),
        DynamicImage::ImageRgb8(b)   => DynamicImage::ImageRgb8(downsample_nearest(&b, stride)),
        DynamicImage::ImageRgba8(b)  => DynamicImage::ImageRgba8(downsample_nearest(&b, stride)),
        other => DynamicImage::ImageRgba8(downsample_nearest(&other.to_rgba8(), stride)),
    }
}

fn downsample_image_file(src: &Path, dst: &Path, stride: u32) -> Result<()> {
    let img = image::open(src)?;
    downsample_dynamic(img, stride).save(dst)?;
    Ok(())
}
