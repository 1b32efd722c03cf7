//! Square scalar signal field with toroidal wrapping and a double-buffered
//! diffusion-decay update.
//!
//! A `Field` stores `width * width` f64 concentrations in row-major layout
//! (`index = y * width + x`). Coordinate access wraps toroidally, so negative
//! and overflowing indices alias valid cells and no access can fail.
//!
//! Values are never clamped. With parameters outside the explicit-scheme
//! stability bound the update diverges or goes negative; [`SimParams::validate`]
//! is where such configurations are rejected.

use crate::error::SimError;
use crate::params::SimParams;

/// A `width x width` toroidal concentration grid backed by two buffers.
///
/// `buffers[front]` is the current grid. [`Field::diffuse_and_decay`] writes
/// the next state into the other buffer and then flips `front`.
#[derive(Debug, Clone)]
pub struct Field {
    width: usize,
    buffers: [Vec<f64>; 2],
    front: usize,
}

impl Field {
    /// Creates a zero-filled field.
    ///
    /// Returns `SimError::InvalidDimensions` if `width` is zero or
    /// `width * width` overflows `usize`.
    pub fn new(width: usize) -> Result<Self, SimError> {
        Self::filled(width, 0.0)
    }

    /// Creates a field with every cell set to `value`.
    pub fn filled(width: usize, value: f64) -> Result<Self, SimError> {
        let len = cell_count(width)?;
        Ok(Self {
            width,
            buffers: [vec![value; len], vec![0.0; len]],
            front: 0,
        })
    }

    /// Creates a field from a row-major data vector.
    ///
    /// Returns `SimError::DimensionMismatch` unless `data.len() == width * width`.
    pub fn from_data(width: usize, data: Vec<f64>) -> Result<Self, SimError> {
        let expected = cell_count(width)?;
        if data.len() != expected {
            return Err(SimError::DimensionMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            buffers: [data, vec![0.0; expected]],
            front: 0,
        })
    }

    /// Grid width (and height) in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Read-only view of the current grid in row-major order.
    pub fn data(&self) -> &[f64] {
        &self.buffers[self.front]
    }

    /// Reduces a signed coordinate onto `[0, width)`.
    pub fn wrap(&self, coord: isize) -> usize {
        coord.rem_euclid(self.width as isize) as usize
    }

    fn index(&self, x: isize, y: isize) -> usize {
        self.wrap(y) * self.width + self.wrap(x)
    }

    /// Current concentration at `(x, y)` with toroidal wrapping.
    pub fn read(&self, x: isize, y: isize) -> f64 {
        self.buffers[self.front][self.index(x, y)]
    }

    /// Overwrites the concentration at `(x, y)` with toroidal wrapping.
    pub fn set(&mut self, x: isize, y: isize, value: f64) {
        let idx = self.index(x, y);
        self.buffers[self.front][idx] = value;
    }

    /// Adds `amount` at `(x, y)` in the current grid.
    ///
    /// Deposits within a tick accumulate and are visible to later reads in
    /// the same tick.
    pub fn secrete(&mut self, x: isize, y: isize, amount: f64) {
        let idx = self.index(x, y);
        self.buffers[self.front][idx] += amount;
    }

    /// Advances the grid by one explicit finite-difference step:
    ///
    /// `new = old + D * (sum4 - 4 * old) / dh^2 * dt - k * old * dt`
    ///
    /// Every new value is computed from the pre-update grid; the result
    /// becomes current by flipping the front buffer.
    pub fn diffuse_and_decay(&mut self, params: &SimParams) {
        let w = self.width;
        let d = params.diffusion;
        let dh2 = params.spatial_step * params.spatial_step;
        let dt = params.time_step;
        let k = params.decay;

        let (front, back) = self.split_buffers();
        for y in 0..w {
            for x in 0..w {
                let idx = y * w + x;
                let c = front[idx];
                let lap = laplacian_5pt(front, x, y, w);
                back[idx] = c + d * lap / dh2 * dt - k * c * dt;
            }
        }
        self.front = 1 - self.front;
    }

    /// Splits into (current, next) so the update can read one buffer while
    /// writing the other.
    fn split_buffers(&mut self) -> (&[f64], &mut [f64]) {
        let [a, b] = &mut self.buffers;
        if self.front == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Sum of all concentrations.
    pub fn total(&self) -> f64 {
        self.data().iter().sum()
    }

    /// Largest concentration in the grid.
    pub fn max(&self) -> f64 {
        self.data().iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Iterates over all cells yielding `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data().iter().enumerate().map(|(i, &v)| {
            let x = i % self.width;
            let y = i / self.width;
            (x, y, v)
        })
    }
}

fn cell_count(width: usize) -> Result<usize, SimError> {
    if width == 0 {
        return Err(SimError::InvalidDimensions);
    }
    width
        .checked_mul(width)
        .ok_or(SimError::InvalidDimensions)
}

/// 5-point Laplacian numerator `n + s + e + w - 4 * center` with toroidal
/// neighbors, unscaled by `dh^2`.
fn laplacian_5pt(data: &[f64], x: usize, y: usize, w: usize) -> f64 {
    let xm = (x + w - 1) % w;
    let xp = (x + 1) % w;
    let ym = (y + w - 1) % w;
    let yp = (y + 1) % w;

    let n = data[ym * w + x];
    let s = data[yp * w + x];
    let west = data[y * w + xm];
    let east = data[y * w + xp];

    n + s + west + east - 4.0 * data[y * w + x]
}
