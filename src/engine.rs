use crate::error::SimError;
use crate::model::{Agent, Bounds, DEFAULT_RADIUS, Pathogen};
use crate::spatial::{DEFAULT_CELL_SIZE, SpatialIndex};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Neighbor search used by the infection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Only agents in the infected agent's own cell are tested.
    #[default]
    Indexed,
    /// Every agent is tested against every infected agent.
    BruteForce,
}

/// Tunable constants of a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimParams {
    /// Agent radius, used for both the step size and the collision footprint.
    pub radius: f64,
    /// Edge length of a spatial index cell.
    pub cell_size: f64,
    pub pathogen: Pathogen,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            cell_size: DEFAULT_CELL_SIZE,
            pathogen: Pathogen::default(),
        }
    }
}

/// Simulation engine.
///
/// Owns the agent population and the spatial index, and advances them one
/// tick at a time. Randomness is always supplied by the caller so that
/// runs can be reproduced from a seed.
#[derive(Debug, Clone)]
pub struct Simulation {
    bounds: Bounds,
    pathogen: Pathogen,
    agents: Vec<Agent>,
    elapsed_ticks: u64,
    index: SpatialIndex,
}

impl Simulation {
    /// Create a simulation of `n_agents` agents with default parameters.
    pub fn new<R: Rng + ?Sized>(
        width: f64,
        height: f64,
        n_agents: usize,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        Self::with_params(width, height, n_agents, &SimParams::default(), rng)
    }

    pub fn with_params<R: Rng + ?Sized>(
        width: f64,
        height: f64,
        n_agents: usize,
        params: &SimParams,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        validate(width, height, params)?;

        let bounds = Bounds::new(width, height);
        let agents = (0..n_agents)
            .map(|_| Agent::new(&bounds, params.radius, rng))
            .collect();

        Ok(Self {
            bounds,
            pathogen: params.pathogen.clone(),
            agents,
            elapsed_ticks: 0,
            index: SpatialIndex::new(params.cell_size),
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn pathogen(&self) -> &Pathogen {
        &self.pathogen
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable access to one agent's infection state.
    pub fn agent_mut(&mut self, i_agt: usize) -> Option<&mut Agent> {
        self.agents.get_mut(i_agt)
    }

    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn count_infected(&self) -> usize {
        self.agents.iter().filter(|agt| agt.is_infected()).count()
    }

    /// Infect one healthy agent chosen uniformly at random.
    ///
    /// Returns the index of the newly infected agent.
    pub fn seed_infection<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize, SimError> {
        let healthy: Vec<usize> = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, agt)| !agt.is_infected())
            .map(|(i_agt, _)| i_agt)
            .collect();

        let &i_agt = healthy.choose(rng).ok_or(SimError::NoHealthyAgents)?;
        let infection = self.pathogen.spawn(rng);
        self.agents[i_agt].infect(infection);
        Ok(i_agt)
    }

    pub fn clear_all_infections(&mut self) {
        self.agents.iter_mut().for_each(Agent::cure);
    }

    /// Rebuild the spatial index from the current positions.
    pub fn rebuild_index(&mut self) {
        self.index.clear();
        for (i_agt, agt) in self.agents.iter().enumerate() {
            self.index.insert(i_agt, agt.position());
        }
    }

    /// Advance one tick using the indexed infection pass.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.step_with(Propagation::Indexed, rng);
    }

    /// Advance one tick: move every agent, rebuild the index, then spread infections.
    pub fn step_with<R: Rng + ?Sized>(&mut self, propagation: Propagation, rng: &mut R) {
        self.elapsed_ticks += 1;

        self.index.clear();
        for (i_agt, agt) in self.agents.iter_mut().enumerate() {
            agt.update(&self.bounds, rng);
            self.index.insert(i_agt, agt.position());
        }

        self.propagate_infections(propagation, rng);
    }

    /// Reference O(n^2) infection pass.
    pub fn propagate_infections_bruteforce<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.propagate_infections(Propagation::BruteForce, rng);
    }

    /// Infection pass restricted to each infected agent's own index cell.
    ///
    /// Assumes the index reflects the current positions.
    pub fn propagate_infections_indexed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.propagate_infections(Propagation::Indexed, rng);
    }

    pub fn propagate_infections<R: Rng + ?Sized>(&mut self, propagation: Propagation, rng: &mut R) {
        let mut i_agt_hit = Vec::new();

        // Agents infected earlier in the pass spread further within the same pass.
        // An infected agent always collides with itself and restarts its own countdown.
        for i_agt in 0..self.agents.len() {
            let agt = &self.agents[i_agt];
            if !agt.is_infected() {
                continue;
            }

            i_agt_hit.clear();
            match propagation {
                Propagation::Indexed => i_agt_hit.extend(
                    self.index
                        .neighbors_of(agt.position())
                        .iter()
                        .copied()
                        .filter(|&i_oth| agt.collides_with(&self.agents[i_oth])),
                ),
                Propagation::BruteForce => i_agt_hit.extend(
                    (0..self.agents.len()).filter(|&i_oth| agt.collides_with(&self.agents[i_oth])),
                ),
            }

            for &i_oth in &i_agt_hit {
                let infection = self.pathogen.spawn(rng);
                self.agents[i_oth].infect(infection);
            }
        }
    }
}

fn validate(width: f64, height: f64, params: &SimParams) -> Result<(), SimError> {
    let invalid = |msg: String| Err(SimError::InvalidConfiguration(msg));

    if !(width.is_finite() && width > 0.0) {
        return invalid(format!("world width must be positive, but is {width}"));
    }
    if !(height.is_finite() && height > 0.0) {
        return invalid(format!("world height must be positive, but is {height}"));
    }
    if !(params.radius.is_finite() && params.radius >= 2.0) {
        return invalid(format!(
            "agent radius must be at least 2, but is {}",
            params.radius
        ));
    }
    if !(params.cell_size.is_finite() && params.cell_size > 0.0) {
        return invalid(format!(
            "cell size must be positive, but is {}",
            params.cell_size
        ));
    }
    let diameter = 2.0 * params.radius;
    if width < diameter || height < diameter {
        return invalid(format!(
            "world {width}x{height} is smaller than an agent diameter of {diameter}"
        ));
    }
    Ok(())
}
