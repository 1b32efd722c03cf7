#![deny(unsafe_code)]
//! Snapshot rendering for the aggregation simulation.
//!
//! This crate is the exporter side of the
//! [`SnapshotExporter`](aggregation_chemotaxis::SnapshotExporter) seam: it
//! consumes read-only snapshots and never touches simulation state. The
//! pixel conversion in [`pixel`] is always available; PNG output and the run
//! manifest live in [`snapshot`] behind the `png` feature (default on).

pub mod palette;
pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use palette::{Palette, Rgb};
pub use pixel::RenderStyle;

#[cfg(feature = "png")]
pub use snapshot::PngExporter;
