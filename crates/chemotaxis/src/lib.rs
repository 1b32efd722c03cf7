#![deny(unsafe_code)]
//! Chemotactic aggregation: agents secrete a diffusing signal into a toroidal
//! [`Field`](aggregation_core::Field) and take stochastic steps biased toward
//! higher concentration.
//!
//! Each tick runs three strictly ordered phases:
//! 1. the field diffuses and decays (double-buffered),
//! 2. every agent secretes at its cell,
//! 3. every agent attempts one move, reading the field immutably.
//!
//! [`Simulation`] owns all mutable state and drives batches of ticks,
//! handing a read-only [`Snapshot`] to a [`SnapshotExporter`] at step 0 and
//! after every batch.

pub mod agents;
pub mod simulation;
pub mod snapshot;

pub use agents::{acceptance_probability, Agent, AgentPopulation, TEMPERATURE};
pub use simulation::{run, RunSummary, Simulation};
pub use snapshot::{Snapshot, SnapshotExporter};
