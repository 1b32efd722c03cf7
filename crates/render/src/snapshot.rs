//! PNG frame export and the run manifest.
//!
//! This module is feature-gated behind `png` (default on) so the pixel
//! conversion can be used without pulling in the `image` crate.
//!
//! Frames are named `<prefix>_<step:06>.png` from the step label, so a run
//! never probes the filesystem for a free name. The manifest records the
//! parameters, seed, and per-frame statistics that label each frame.

use aggregation_chemotaxis::{Snapshot, SnapshotExporter};
use aggregation_core::error::SimError;
use aggregation_core::params::SimParams;
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pixel::{snapshot_to_rgba, RenderStyle};

/// File name of the manifest written by [`PngExporter::write_manifest`].
pub const MANIFEST_FILE: &str = "manifest.json";

/// Writes one snapshot as a PNG image.
///
/// Returns `SimError::InvalidDimensions` if the image side overflows `u32`,
/// or `SimError::Io` on encode/write failure.
pub fn write_png(
    snapshot: &Snapshot<'_>,
    style: &RenderStyle,
    path: &Path,
) -> Result<(), SimError> {
    let rgba = snapshot_to_rgba(snapshot, style)?;
    let side = style
        .image_side(snapshot.width())
        .and_then(|s| u32::try_from(s).ok())
        .ok_or(SimError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(side, side, rgba)
        .ok_or_else(|| SimError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| SimError::Io(format!("{}: {e}", path.display())))
}

/// Manifest entry for one exported frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub step: usize,
    /// File name relative to the output directory.
    pub file: String,
    pub agents: usize,
    pub total_concentration: f64,
    pub max_concentration: f64,
}

#[derive(Serialize)]
struct Manifest<'a> {
    seed: u64,
    params: &'a SimParams,
    frames: &'a [FrameRecord],
}

/// Exporter that writes every snapshot to `<dir>/<prefix>_<step:06>.png`.
pub struct PngExporter {
    dir: PathBuf,
    prefix: String,
    style: RenderStyle,
    frames: Vec<FrameRecord>,
}

impl PngExporter {
    /// Validates `style` and creates `dir` if it does not exist.
    pub fn new(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        style: RenderStyle,
    ) -> Result<Self, SimError> {
        style.validate()?;
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| SimError::Io(format!("cannot create {}: {e}", dir.display())))?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            style,
            frames: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn frame_name(&self, step: usize) -> String {
        format!("{}_{step:06}.png", self.prefix)
    }

    /// Path the frame for `step` is written to.
    pub fn frame_path(&self, step: usize) -> PathBuf {
        self.dir.join(self.frame_name(step))
    }

    /// Frames written so far, in export order.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Writes `manifest.json` into the output directory and returns its path.
    pub fn write_manifest(&self, params: &SimParams, seed: u64) -> Result<PathBuf, SimError> {
        let manifest = Manifest {
            seed,
            params,
            frames: &self.frames,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| SimError::Io(format!("manifest serialization failed: {e}")))?;
        let path = self.dir.join(MANIFEST_FILE);
        fs::write(&path, json).map_err(|e| SimError::Io(format!("{}: {e}", path.display())))?;
        Ok(path)
    }
}

impl SnapshotExporter for PngExporter {
    fn export(&mut self, snapshot: &Snapshot<'_>) -> Result<(), SimError> {
        let file = self.frame_name(snapshot.step);
        let path = self.dir.join(&file);
        write_png(snapshot, &self.style, &path)?;
        debug!("wrote frame for step {} to {}", snapshot.step, path.display());
        self.frames.push(FrameRecord {
            step: snapshot.step,
            file,
            agents: snapshot.agents.len(),
            total_concentration: snapshot.field.total(),
            max_concentration: snapshot.field.max(),
        });
        Ok(())
    }
}
