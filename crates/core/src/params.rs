//! Run configuration for the aggregation model.
//!
//! [`SimParams`] is deserialized from JSON with per-field defaults (the
//! reference run: 1000 agents on a 100x100 torus, 5 batches of 100 steps).
//! Unknown keys are rejected so a typo cannot silently fall back to a default.
//! Parameters are never mutated once a run starts.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Default population size.
pub const DEFAULT_AGENT_COUNT: usize = 1000;
/// Default grid width (the grid is `width x width`).
pub const DEFAULT_WIDTH: usize = 100;
/// Default signal diffusion coefficient (D).
pub const DEFAULT_DIFFUSION: f64 = 0.001;
/// Default spatial step (dh).
pub const DEFAULT_SPATIAL_STEP: f64 = 0.01;
/// Default temporal step (dt).
pub const DEFAULT_TIME_STEP: f64 = 0.01;
/// Default signal decay rate (k).
pub const DEFAULT_DECAY: f64 = 0.1;
/// Default per-agent secretion rate (f).
pub const DEFAULT_SECRETION: f64 = 1.5;
/// Default number of snapshot batches.
pub const DEFAULT_BATCHES: usize = 5;
/// Default ticks per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on `D * dt / dh^2` for the explicit 5-point scheme in 2D.
pub const DIFFUSION_NUMBER_LIMIT: f64 = 0.25;
/// Smallest grid width for which the four stencil neighbors are distinct.
pub const MIN_WIDTH: usize = 3;

/// Immutable parameters for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimParams {
    /// Number of agents, constant for the run.
    pub agent_count: usize,
    /// Grid width in cells.
    pub width: usize,
    /// Diffusion coefficient D.
    pub diffusion: f64,
    /// Spatial step dh.
    pub spatial_step: f64,
    /// Temporal step dt.
    pub time_step: f64,
    /// Decay rate k.
    pub decay: f64,
    /// Secretion rate f; each agent deposits `f * dt` per tick.
    pub secretion: f64,
    /// Number of batches; one snapshot is exported after each.
    pub batches: usize,
    /// Ticks per batch.
    pub batch_size: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            agent_count: DEFAULT_AGENT_COUNT,
            width: DEFAULT_WIDTH,
            diffusion: DEFAULT_DIFFUSION,
            spatial_step: DEFAULT_SPATIAL_STEP,
            time_step: DEFAULT_TIME_STEP,
            decay: DEFAULT_DECAY,
            secretion: DEFAULT_SECRETION,
            batches: DEFAULT_BATCHES,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SimParams {
    /// Deserializes parameters from a JSON object, filling missing keys with
    /// defaults. Does not validate; call [`SimParams::validate`].
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Current values as a JSON object.
    pub fn to_json(&self) -> Value {
        json!({
            "agent_count": self.agent_count,
            "width": self.width,
            "diffusion": self.diffusion,
            "spatial_step": self.spatial_step,
            "time_step": self.time_step,
            "decay": self.decay,
            "secretion": self.secretion,
            "batches": self.batches,
            "batch_size": self.batch_size,
        })
    }

    /// The dimensionless diffusion number `D * dt / dh^2`.
    pub fn diffusion_number(&self) -> f64 {
        self.diffusion * self.time_step / (self.spatial_step * self.spatial_step)
    }

    /// Amount deposited by one agent in one tick (`f * dt`).
    pub fn secretion_per_tick(&self) -> f64 {
        self.secretion * self.time_step
    }

    /// Total ticks in the run, or `None` on overflow.
    pub fn total_steps(&self) -> Option<usize> {
        self.batches.checked_mul(self.batch_size)
    }

    /// Rejects configurations that cannot produce a meaningful run.
    ///
    /// Zero is accepted for `diffusion`, `decay`, and `secretion` (it disables
    /// that term). The stability checks bound divergence but do not promise
    /// non-negative field values.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.width < MIN_WIDTH {
            return Err(SimError::WidthTooSmall { width: self.width });
        }
        self.width
            .checked_mul(self.width)
            .ok_or(SimError::InvalidDimensions)?;
        if self.agent_count == 0 {
            return Err(SimError::NoAgents);
        }
        if self.batches == 0 || self.batch_size == 0 {
            return Err(SimError::InvalidParameter {
                name: if self.batches == 0 {
                    "batches"
                } else {
                    "batch_size"
                },
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        self.total_steps().ok_or(SimError::StepOverflow {
            batches: self.batches,
            batch_size: self.batch_size,
        })?;

        require_positive("spatial_step", self.spatial_step)?;
        require_positive("time_step", self.time_step)?;
        require_non_negative("diffusion", self.diffusion)?;
        require_non_negative("decay", self.decay)?;
        require_non_negative("secretion", self.secretion)?;

        let ratio = self.diffusion_number();
        if !ratio.is_finite() || ratio > DIFFUSION_NUMBER_LIMIT {
            return Err(SimError::UnstableDiffusion {
                ratio,
                limit: DIFFUSION_NUMBER_LIMIT,
            });
        }
        let product = self.decay * self.time_step;
        if !product.is_finite() || product > 1.0 {
            return Err(SimError::UnstableDecay { product });
        }
        Ok(())
    }

    /// Schema describing every parameter: type, default, minimum, description.
    pub fn schema() -> Value {
        json!({
            "agent_count": {
                "type": "integer",
                "default": DEFAULT_AGENT_COUNT,
                "min": 1,
                "description": "Number of agents (constant for the run)"
            },
            "width": {
                "type": "integer",
                "default": DEFAULT_WIDTH,
                "min": MIN_WIDTH,
                "description": "Grid width in cells; the width x width grid wraps at the edges"
            },
            "diffusion": {
                "type": "number",
                "default": DEFAULT_DIFFUSION,
                "min": 0.0,
                "description": "Signal diffusion coefficient D"
            },
            "spatial_step": {
                "type": "number",
                "default": DEFAULT_SPATIAL_STEP,
                "exclusive_min": 0.0,
                "description": "Spatial step dh between grid cells"
            },
            "time_step": {
                "type": "number",
                "default": DEFAULT_TIME_STEP,
                "exclusive_min": 0.0,
                "description": "Temporal step dt per tick; D*dt/dh^2 must not exceed 0.25"
            },
            "decay": {
                "type": "number",
                "default": DEFAULT_DECAY,
                "min": 0.0,
                "description": "Signal decay rate k; k*dt must not exceed 1"
            },
            "secretion": {
                "type": "number",
                "default": DEFAULT_SECRETION,
                "min": 0.0,
                "description": "Secretion rate f; each agent deposits f*dt at its cell per tick"
            },
            "batches": {
                "type": "integer",
                "default": DEFAULT_BATCHES,
                "min": 1,
                "description": "Number of batches; a snapshot is exported after each"
            },
            "batch_size": {
                "type": "integer",
                "default": DEFAULT_BATCH_SIZE,
                "min": 1,
                "description": "Ticks per batch"
            }
        })
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

fn require_non_negative(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite and >= 0",
        })
    }
}
