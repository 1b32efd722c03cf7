//! Agents and the secrete/move update.
//!
//! An agent is nothing but an integer cell position. Per tick the whole
//! population first secretes, then moves; the two passes never interleave, so
//! every move decision sees every deposit made in that tick.

use aggregation_core::error::SimError;
use aggregation_core::field::Field;
use rand::Rng;

/// Temperature of the logistic acceptance rule.
pub const TEMPERATURE: f64 = 0.1;

/// Probability of accepting a move whose concentration difference is
/// `delta = C(candidate) - C(current)`: `sigmoid(delta / T)`.
///
/// Evaluated in a form that never overflows: `+inf` maps to 1, `-inf` to 0,
/// and `0` to exactly 0.5.
pub fn acceptance_probability(delta: f64) -> f64 {
    let z = delta / TEMPERATURE;
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// One motile unit on the toroidal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub x: usize,
    pub y: usize,
}

impl Agent {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// The cell reached by `offset`, wrapped onto `field`.
    pub fn candidate(&self, field: &Field, (dx, dy): (isize, isize)) -> Agent {
        Agent {
            x: field.wrap(self.x as isize + dx),
            y: field.wrap(self.y as isize + dy),
        }
    }

    /// Evaluates one proposed move and commits it when `draw` falls below the
    /// acceptance probability.
    ///
    /// Returns whether the proposal was accepted. An accepted zero offset
    /// leaves the position unchanged.
    pub fn attempt_move(&mut self, field: &Field, offset: (isize, isize), draw: f64) -> bool {
        let candidate = self.candidate(field, offset);
        let here = field.read(self.x as isize, self.y as isize);
        let there = field.read(candidate.x as isize, candidate.y as isize);
        let accepted = draw < acceptance_probability(there - here);
        if accepted {
            *self = candidate;
        }
        accepted
    }
}

/// The fixed-size set of agents for a run.
#[derive(Debug, Clone)]
pub struct AgentPopulation {
    agents: Vec<Agent>,
}

impl AgentPopulation {
    /// Places `count` agents uniformly at random on a `width x width` grid.
    pub fn random<R: Rng + ?Sized>(
        count: usize,
        width: usize,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if width == 0 {
            return Err(SimError::InvalidDimensions);
        }
        if count == 0 {
            return Err(SimError::NoAgents);
        }
        let agents = (0..count)
            .map(|_| Agent::new(rng.gen_range(0..width), rng.gen_range(0..width)))
            .collect();
        Ok(Self { agents })
    }

    /// Wraps an explicit set of agents. Positions must already lie on the grid
    /// they will be stepped on.
    pub fn from_agents(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Read-only view of all agent positions.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Every agent deposits `secretion_rate * dt` at its own cell.
    pub fn secrete_all(&self, field: &mut Field, secretion_rate: f64, dt: f64) {
        let amount = secretion_rate * dt;
        for agent in &self.agents {
            field.secrete(agent.x as isize, agent.y as isize, amount);
        }
    }

    /// Every agent proposes a step of `{-1, 0, 1}` per axis and accepts it
    /// with [`acceptance_probability`].
    ///
    /// Draws per agent, in order: x offset, y offset, acceptance draw in
    /// `[0, 1)`. Returns the number of agents that changed cell.
    pub fn move_all<R: Rng + ?Sized>(&mut self, field: &Field, rng: &mut R) -> usize {
        let mut moved = 0;
        for agent in &mut self.agents {
            let dx = rng.gen_range(-1_isize..=1);
            let dy = rng.gen_range(-1_isize..=1);
            let draw: f64 = rng.gen();
            let before = *agent;
            if agent.attempt_move(field, (dx, dy), draw) && *agent != before {
                moved += 1;
            }
        }
        moved
    }
}
