//! Pure-computation RGBA8 conversion of a [`Snapshot`].
//!
//! Image column = field x, image row = field y, so the buffer follows the
//! field's row-major layout. Each cell becomes a `scale x scale` block and
//! each occupied cell gets a centered agent dot on top.

use crate::palette::{Palette, Rgb};
use aggregation_chemotaxis::Snapshot;
use aggregation_core::error::SimError;

/// How a snapshot is drawn.
#[derive(Debug, Clone)]
pub struct RenderStyle {
    pub palette: Palette,
    /// Pixels per grid cell along each axis (at least 1).
    pub scale: usize,
    /// Concentration mapped to the top of the palette; values are clamped to
    /// `[0, max_value]` for display only.
    pub max_value: f64,
    pub agent_color: Rgb,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            palette: Palette::binary(),
            scale: 4,
            max_value: 1.0,
            agent_color: Rgb::new(0, 0, 255),
        }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.scale == 0 {
            return Err(SimError::InvalidDimensions);
        }
        if !(self.max_value.is_finite() && self.max_value > 0.0) {
            return Err(SimError::InvalidParameter {
                name: "max_value",
                value: self.max_value,
                reason: "must be finite and > 0",
            });
        }
        Ok(())
    }

    /// Side length of the rendered image in pixels, or `None` on overflow.
    pub fn image_side(&self, width: usize) -> Option<usize> {
        width.checked_mul(self.scale)
    }

    /// Edge length of the square agent marker.
    fn dot_size(&self) -> usize {
        (self.scale / 2).max(1)
    }
}

/// Renders the field through the palette and overlays agents.
///
/// Returns a buffer of `(width * scale)^2 * 4` bytes (R, G, B, 255 per pixel).
pub fn snapshot_to_rgba(snapshot: &Snapshot<'_>, style: &RenderStyle) -> Result<Vec<u8>, SimError> {
    style.validate()?;
    let width = snapshot.width();
    let scale = style.scale;
    let side = style.image_side(width).ok_or(SimError::InvalidDimensions)?;
    let len = side
        .checked_mul(side)
        .and_then(|n| n.checked_mul(4))
        .ok_or(SimError::InvalidDimensions)?;

    let mut buf = vec![0u8; len];
    for (x, y, value) in snapshot.field.iter() {
        let color = style.palette.sample(value / style.max_value);
        fill_block(&mut buf, side, x * scale, y * scale, scale, color);
    }

    let dot = style.dot_size();
    let inset = (scale - dot) / 2;
    for agent in snapshot.agents {
        fill_block(
            &mut buf,
            side,
            agent.x * scale + inset,
            agent.y * scale + inset,
            dot,
            style.agent_color,
        );
    }
    Ok(buf)
}

/// Fills a `size x size` pixel square whose top-left corner is `(px, py)`.
fn fill_block(buf: &mut [u8], side: usize, px: usize, py: usize, size: usize, color: Rgb) {
    for row in py..(py + size).min(side) {
        for col in px..(px + size).min(side) {
            let i = (row * side + col) * 4;
            buf[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
        }
    }
}
