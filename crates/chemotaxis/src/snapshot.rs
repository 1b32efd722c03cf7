//! Read-only view of simulation state handed to an exporter between ticks.

use crate::agents::Agent;
use aggregation_core::error::SimError;
use aggregation_core::field::Field;

/// Borrowed state at one step index.
///
/// Holds shared references only; the simulation resumes mutating the same
/// buffers as soon as the exporter returns.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub field: &'a Field,
    pub agents: &'a [Agent],
    /// Cumulative ticks completed when the snapshot was taken.
    pub step: usize,
}

impl Snapshot<'_> {
    pub fn width(&self) -> usize {
        self.field.width()
    }
}

/// Receives snapshots at step 0 and after each batch.
///
/// Export runs synchronously on the simulation thread. An error propagates
/// out of [`Simulation::run`](crate::Simulation::run) and halts the run.
pub trait SnapshotExporter {
    fn export(&mut self, snapshot: &Snapshot<'_>) -> Result<(), SimError>;
}

impl<F> SnapshotExporter for F
where
    F: FnMut(&Snapshot<'_>) -> Result<(), SimError>,
{
    fn export(&mut self, snapshot: &Snapshot<'_>) -> Result<(), SimError> {
        self(snapshot)
    }
}
