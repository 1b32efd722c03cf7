//! Color stops sampled by linear interpolation.
//!
//! Stops are evenly spaced along `t`: `sample(0.0)` is the first stop and
//! `sample(1.0)` the last. Interpolation is per channel in sRGB.

use aggregation_core::error::SimError;

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `"#rrggbb"` or `"rrggbb"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Self, SimError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(SimError::InvalidColor(format!(
                "expected 6 hex digits, got '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| SimError::InvalidColor(format!("invalid hex digits in '{hex}'")))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + t * (f64::from(b) - f64::from(a))).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// All named palettes, in listing order.
const PALETTE_NAMES: &[&str] = &["binary", "gray", "heat", "ocean"];

/// A sequence of color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    stops: Vec<Rgb>,
}

impl Palette {
    /// Requires at least one stop.
    pub fn new(stops: Vec<Rgb>) -> Result<Self, SimError> {
        if stops.is_empty() {
            return Err(SimError::InvalidPalette(
                "palette requires at least 1 color".to_string(),
            ));
        }
        Ok(Self { stops })
    }

    pub fn from_hex(hexes: &[&str]) -> Result<Self, SimError> {
        let stops = hexes
            .iter()
            .map(|h| Rgb::from_hex(h))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stops)
    }

    /// Looks up a named palette.
    pub fn from_name(name: &str) -> Result<Self, SimError> {
        match name {
            "binary" => Ok(Self::binary()),
            "gray" => Ok(Self::gray()),
            "heat" => Ok(Self::heat()),
            "ocean" => Ok(Self::ocean()),
            _ => Err(SimError::InvalidPalette(format!(
                "unknown palette '{name}' (available: {})",
                PALETTE_NAMES.join(", ")
            ))),
        }
    }

    pub fn list_names() -> &'static [&'static str] {
        PALETTE_NAMES
    }

    /// White at zero concentration, black at full.
    pub fn binary() -> Self {
        Self {
            stops: vec![Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)],
        }
    }

    pub fn gray() -> Self {
        Self {
            stops: vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
        }
    }

    pub fn heat() -> Self {
        Self {
            stops: vec![
                Rgb::new(0, 0, 0),
                Rgb::new(128, 0, 0),
                Rgb::new(255, 96, 0),
                Rgb::new(255, 220, 64),
                Rgb::new(255, 255, 255),
            ],
        }
    }

    pub fn ocean() -> Self {
        Self {
            stops: vec![
                Rgb::new(8, 16, 48),
                Rgb::new(16, 80, 140),
                Rgb::new(48, 170, 200),
                Rgb::new(220, 245, 250),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always false for a constructed palette.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Samples at `t`, clamped to [0, 1]; NaN samples the first stop.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let n = self.stops.len();
        if n == 1 {
            return self.stops[0];
        }
        let scaled = t * (n - 1) as f64;
        let idx = (scaled as usize).min(n - 2);
        let frac = scaled - idx as f64;
        self.stops[idx].lerp(self.stops[idx + 1], frac)
    }
}
