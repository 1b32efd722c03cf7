//! Error types for the aggregation simulation.

use thiserror::Error;

/// Errors produced by field construction, configuration validation, and
/// snapshot export.
#[derive(Debug, Error)]
pub enum SimError {
    /// Width was zero (or `width * width` overflowed) when creating a Field.
    #[error("invalid dimensions: width must be non-zero and width * width must fit in memory")]
    InvalidDimensions,

    /// A data buffer did not match the `width * width` cell count.
    #[error("dimension mismatch: expected {expected} cells, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// The grid is too narrow for the 5-point neighbor stencil.
    #[error("grid width {width} is too small: the neighbor stencil needs width >= 3")]
    WidthTooSmall { width: usize },

    /// The configured population is empty.
    #[error("agent_count must be at least 1")]
    NoAgents,

    /// A parameter was zero, negative, or non-finite where that is not allowed.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// `D * dt / dh^2` exceeds the explicit-scheme stability limit.
    #[error("unstable diffusion: D*dt/dh^2 = {ratio} exceeds the explicit-scheme limit {limit}")]
    UnstableDiffusion { ratio: f64, limit: f64 },

    /// `k * dt` exceeds 1, so a single decay step would overshoot past zero.
    #[error("unstable decay: k*dt = {product} exceeds 1")]
    UnstableDecay { product: f64 },

    /// `batches * batch_size` does not fit in a step counter.
    #[error("step count overflow: {batches} batches of {batch_size} steps")]
    StepOverflow { batches: usize, batch_size: usize },

    /// Advancing the step counter by `ticks` would wrap past `usize::MAX`.
    #[error("step counter overflow: cannot advance {ticks} ticks from step {step}")]
    StepCounterOverflow { step: usize, ticks: usize },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A palette could not be constructed or looked up.
    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    /// Snapshot export failed (file write, encoding).
    #[error("I/O error: {0}")]
    Io(String),
}
