#![deny(unsafe_code)]
//! Core types for the chemotactic aggregation simulation.
//!
//! Provides the double-buffered toroidal [`Field`] with its diffusion-decay
//! update, the immutable run configuration [`SimParams`], and [`SimError`].

pub mod error;
pub mod field;
pub mod params;

pub use error::SimError;
pub use field::Field;
pub use params::SimParams;
