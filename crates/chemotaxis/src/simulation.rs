//! Simulation driver: owns the field, the population, the RNG, and the step
//! counter, and runs the batched loop with snapshot export.

use crate::agents::AgentPopulation;
use crate::snapshot::{Snapshot, SnapshotExporter};
use aggregation_core::error::SimError;
use aggregation_core::field::Field;
use aggregation_core::params::SimParams;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Outcome of [`Simulation::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    /// Step counter at the end of the run.
    pub steps: usize,
    /// Number of snapshots handed to the exporter.
    pub snapshots: usize,
    pub agents: usize,
    pub total_concentration: f64,
    pub max_concentration: f64,
}

/// Complete state of one run.
///
/// A single seeded [`StdRng`] supplies every random draw (initial placement,
/// move offsets, acceptance draws), so equal `(params, seed)` pairs produce
/// bit-identical trajectories.
pub struct Simulation {
    params: SimParams,
    field: Field,
    population: AgentPopulation,
    rng: StdRng,
    step: usize,
}

impl Simulation {
    /// Validates `params`, then allocates a zero field and places
    /// `agent_count` agents uniformly at random.
    pub fn new(params: SimParams, seed: u64) -> Result<Self, SimError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let field = Field::new(params.width)?;
        let population = AgentPopulation::random(params.agent_count, params.width, &mut rng)?;
        debug!(
            "initialized {} agents on a {w}x{w} torus (seed {seed}, D*dt/dh^2 = {:.4})",
            population.len(),
            params.diffusion_number(),
            w = params.width,
        );
        Ok(Self {
            params,
            field,
            population,
            rng,
            step: 0,
        })
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn population(&self) -> &AgentPopulation {
        &self.population
    }

    /// Ticks completed so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Borrowed view of the current state, labelled with the step counter.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            field: &self.field,
            agents: self.population.agents(),
            step: self.step,
        }
    }

    /// One tick: diffuse/decay, secrete (all agents), then move (all agents).
    ///
    /// Does not advance the step counter; see [`Simulation::advance`].
    /// Returns the number of agents that changed cell.
    pub fn tick(&mut self) -> usize {
        self.field.diffuse_and_decay(&self.params);
        self.population
            .secrete_all(&mut self.field, self.params.secretion, self.params.time_step);
        self.population.move_all(&self.field, &mut self.rng)
    }

    /// Runs `ticks` ticks and adds them to the step counter.
    ///
    /// Returns `SimError::StepCounterOverflow` without ticking if the counter
    /// would wrap.
    pub fn advance(&mut self, ticks: usize) -> Result<(), SimError> {
        let next = self
            .step
            .checked_add(ticks)
            .ok_or(SimError::StepCounterOverflow {
                step: self.step,
                ticks,
            })?;
        let mut moved = 0;
        for _ in 0..ticks {
            moved = self.tick();
        }
        self.step = next;
        debug!(
            "step {}: total {:.4}, max {:.4}, {moved} agents moved in the last tick",
            self.step,
            self.field.total(),
            self.field.max(),
        );
        Ok(())
    }

    /// Exports the current state, then runs the configured batches from it,
    /// exporting after each batch.
    ///
    /// Export is synchronous; the first exporter error stops the run and is
    /// returned, leaving the simulation at the last completed batch.
    pub fn run<E>(&mut self, exporter: &mut E) -> Result<RunSummary, SimError>
    where
        E: SnapshotExporter + ?Sized,
    {
        let batches = self.params.batches;
        let batch_size = self.params.batch_size;
        info!(
            "running {batches} batches of {batch_size} ticks ({} agents, width {})",
            self.population.len(),
            self.params.width,
        );

        exporter.export(&self.snapshot())?;
        let mut snapshots = 1;
        for _ in 0..batches {
            self.advance(batch_size)?;
            exporter.export(&self.snapshot())?;
            snapshots += 1;
        }

        let summary = RunSummary {
            steps: self.step,
            snapshots,
            agents: self.population.len(),
            total_concentration: self.field.total(),
            max_concentration: self.field.max(),
        };
        info!(
            "finished at step {} with {} snapshots (total concentration {:.4})",
            summary.steps, summary.snapshots, summary.total_concentration
        );
        Ok(summary)
    }
}

/// Builds a [`Simulation`] from `params` and `seed` and runs it to completion.
pub fn run<E>(params: SimParams, seed: u64, exporter: &mut E) -> Result<RunSummary, SimError>
where
    E: SnapshotExporter + ?Sized,
{
    Simulation::new(params, seed)?.run(exporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_params() -> SimParams {
        SimParams {
            agent_count: 20,
            width: 10,
            batches: 3,
            batch_size: 4,
            ..SimParams::default()
        }
    }

    fn field_bits(sim: &Simulation) -> Vec<u64> {
        sim.field().data().iter().map(|v| v.to_bits()).collect()
    }

    fn distinct_cells(sim: &Simulation) -> usize {
        sim.population()
            .agents()
            .iter()
            .map(|a| (a.x, a.y))
            .collect::<HashSet<_>>()
            .len()
    }

    // ---- Construction ----

    #[test]
    fn new_rejects_invalid_params() {
        let bad = SimParams {
            width: 2,
            ..small_params()
        };
        assert!(matches!(
            Simulation::new(bad, 1),
            Err(SimError::WidthTooSmall { .. })
        ));
        let unstable = SimParams {
            diffusion: 1.0,
            ..small_params()
        };
        assert!(matches!(
            Simulation::new(unstable, 1),
            Err(SimError::UnstableDiffusion { .. })
        ));
    }

    #[test]
    fn new_starts_at_step_zero_with_empty_field() {
        let sim = Simulation::new(small_params(), 42).unwrap();
        assert_eq!(sim.step(), 0);
        assert_eq!(sim.population().len(), 20);
        assert_eq!(sim.field().width(), 10);
        assert!(sim.field().data().iter().all(|&v| v == 0.0));
    }

    // ---- Tick ordering ----

    #[test]
    fn secretion_follows_diffusion_within_a_tick() {
        // With diffusion off, each tick decays the previous total before the
        // new deposits are added.
        let params = SimParams {
            diffusion: 0.0,
            decay: 0.1,
            ..small_params()
        };
        let mut sim = Simulation::new(params, 3).unwrap();
        let deposit = 20.0 * params.secretion * params.time_step;
        sim.tick();
        assert!((sim.field().total() - deposit).abs() < 1e-12);
        sim.tick();
        let expected = deposit * (1.0 - params.decay * params.time_step) + deposit;
        assert!((sim.field().total() - expected).abs() < 1e-12);
    }

    #[test]
    fn tick_does_not_advance_step_counter() {
        let mut sim = Simulation::new(small_params(), 1).unwrap();
        sim.tick();
        assert_eq!(sim.step(), 0);
        sim.advance(5).unwrap();
        assert_eq!(sim.step(), 5);
    }

    #[test]
    fn moves_see_the_same_tick_secretion() {
        // Each tick deposits 1.0 under the lone agent before it moves, so every
        // step off its cell has p = sigmoid(-10). Were the moves evaluated first,
        // the opening tick would see a flat zero field and accept with p = 0.5.
        let params = SimParams {
            agent_count: 1,
            width: 10,
            diffusion: 0.0,
            decay: 0.0,
            secretion: 100.0,
            ..small_params()
        };
        let mut sim = Simulation::new(params, 17).unwrap();
        let start = sim.population().agents()[0];
        for tick in 0..200 {
            sim.tick();
            assert_eq!(sim.population().agents()[0], start, "left its cell at tick {tick}");
        }
        let (x, y) = (start.x as isize, start.y as isize);
        assert!((sim.field().read(x, y) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn advance_rejects_step_counter_overflow() {
        let mut sim = Simulation::new(small_params(), 1).unwrap();
        sim.step = usize::MAX - 1;
        let before = sim.population().agents().to_vec();
        assert!(matches!(
            sim.advance(2),
            Err(SimError::StepCounterOverflow { ticks: 2, .. })
        ));
        assert_eq!(sim.step(), usize::MAX - 1);
        assert_eq!(sim.population().agents(), before.as_slice());
        assert_eq!(sim.field().total(), 0.0);

        sim.advance(1).unwrap();
        assert_eq!(sim.step(), usize::MAX);
    }

    #[test]
    fn no_decay_total_grows_linearly_with_secretion() {
        let params = SimParams {
            decay: 0.0,
            ..small_params()
        };
        let mut sim = Simulation::new(params, 9).unwrap();
        sim.advance(10).unwrap();
        let expected = 10.0 * 20.0 * params.secretion * params.time_step;
        assert!((sim.field().total() - expected).abs() < 1e-9);
    }

    // ---- Run loop ----

    #[test]
    fn run_exports_initial_state_and_every_batch() {
        let mut sim = Simulation::new(small_params(), 42).unwrap();
        let mut steps = Vec::new();
        let mut totals = Vec::new();
        let summary = sim
            .run(&mut |s: &Snapshot<'_>| -> Result<(), SimError> {
                steps.push(s.step);
                totals.push(s.field.total());
                assert_eq!(s.agents.len(), 20);
                Ok(())
            })
            .unwrap();
        assert_eq!(steps, vec![0, 4, 8, 12]);
        assert_eq!(totals[0], 0.0);
        assert!(totals[1] > 0.0);
        assert_eq!(summary.steps, 12);
        assert_eq!(summary.snapshots, 4);
        assert_eq!(summary.agents, 20);
        assert_eq!(sim.step(), 12);
    }

    #[test]
    fn exporter_error_halts_the_run() {
        let mut sim = Simulation::new(small_params(), 42).unwrap();
        let mut calls = 0;
        let result = sim.run(&mut |_: &Snapshot<'_>| -> Result<(), SimError> {
            calls += 1;
            if calls == 2 {
                Err(SimError::Io("disk full".into()))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(SimError::Io(_))));
        assert_eq!(calls, 2);
        assert_eq!(sim.step(), 4);
    }

    #[test]
    fn free_run_matches_method_run() {
        let mut noop = |_: &Snapshot<'_>| -> Result<(), SimError> { Ok(()) };
        let a = run(small_params(), 5, &mut noop).unwrap();
        let b = Simulation::new(small_params(), 5)
            .unwrap()
            .run(&mut noop)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn summary_serializes_to_json() {
        let mut noop = |_: &Snapshot<'_>| -> Result<(), SimError> { Ok(()) };
        let summary = run(small_params(), 5, &mut noop).unwrap();
        let v = serde_json::to_value(summary).unwrap();
        assert_eq!(v["steps"], 12);
        assert!(v.get("total_concentration").is_some());
    }

    // ---- Determinism ----

    #[test]
    fn same_seed_is_bit_identical_at_every_tick() {
        let mut a = Simulation::new(small_params(), 1234).unwrap();
        let mut b = Simulation::new(small_params(), 1234).unwrap();
        assert_eq!(a.population().agents(), b.population().agents());
        for _ in 0..50 {
            a.tick();
            b.tick();
            assert_eq!(a.population().agents(), b.population().agents());
            assert_eq!(field_bits(&a), field_bits(&b));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Simulation::new(small_params(), 1).unwrap();
        let mut b = Simulation::new(small_params(), 2).unwrap();
        a.advance(10).unwrap();
        b.advance(10).unwrap();
        assert_ne!(a.population().agents(), b.population().agents());
    }

    // ---- Emergent behavior ----

    #[test]
    fn agents_aggregate_over_time() {
        let params = SimParams {
            agent_count: 300,
            width: 30,
            secretion: 5.0,
            ..SimParams::default()
        };
        let mut sim = Simulation::new(params, 42).unwrap();
        let before = distinct_cells(&sim);
        sim.advance(1000).unwrap();
        let after = distinct_cells(&sim);
        assert_eq!(sim.population().len(), 300);
        assert!(
            (after as f64) < 0.9 * before as f64,
            "expected clustering: {before} occupied cells before, {after} after"
        );
    }

    #[test]
    fn agents_sit_above_mean_concentration() {
        let params = SimParams {
            agent_count: 100,
            width: 20,
            ..SimParams::default()
        };
        let mut sim = Simulation::new(params, 8).unwrap();
        sim.advance(200).unwrap();
        let field = sim.field();
        let mean = field.total() / field.data().len() as f64;
        let at_agents: f64 = sim
            .population()
            .agents()
            .iter()
            .map(|a| field.read(a.x as isize, a.y as isize))
            .sum::<f64>()
            / sim.population().len() as f64;
        assert!(at_agents > mean, "{at_agents} <= {mean}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn agent_count_is_invariant(seed: u64, count in 1_usize..64, width in 3_usize..16) {
                let params = SimParams {
                    agent_count: count,
                    width,
                    batches: 2,
                    batch_size: 5,
                    ..SimParams::default()
                };
                let mut sim = Simulation::new(params, seed).unwrap();
                let mut counts = Vec::new();
                sim.run(&mut |s: &Snapshot<'_>| -> Result<(), SimError> {
                    counts.push(s.agents.len());
                    Ok(())
                })
                .unwrap();
                prop_assert!(counts.iter().all(|&c| c == count));
            }

            #[test]
            fn runs_are_reproducible(seed: u64) {
                let mut a = Simulation::new(small_params(), seed).unwrap();
                let mut b = Simulation::new(small_params(), seed).unwrap();
                a.advance(8).unwrap();
                b.advance(8).unwrap();
                prop_assert_eq!(a.population().agents(), b.population().agents());
                prop_assert_eq!(field_bits(&a), field_bits(&b));
            }
        }
    }
}
