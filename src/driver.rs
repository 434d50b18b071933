use crate::config::Config;
use crate::engine::{Propagation, Simulation};
use crate::error::SimError;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use std::str::FromStr;

/// User command, mirroring the interactive key bindings (z, x, c, space).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Rebuild the world and stop the simulation.
    Reset,
    /// Infect one random healthy agent.
    Infect,
    /// Cure every agent.
    Cure,
    /// Start or stop the simulation.
    Toggle,
}

impl FromStr for Action {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "z" | "reset" => Ok(Self::Reset),
            "x" | "infect" => Ok(Self::Infect),
            "c" | "cure" => Ok(Self::Cure),
            "space" | "toggle" => Ok(Self::Toggle),
            other => bail!("unknown action {other:?}"),
        }
    }
}

/// Outcome of [`Driver::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub infected: usize,
    pub peak_infected: usize,
}

/// Headless driver.
///
/// Owns a simulation, the random number generator feeding it, and the
/// flag that decides whether ticks advance it.
pub struct Driver {
    cfg: Config,
    sim: Simulation,
    rng: ChaCha12Rng,
    running: bool,
}

impl Driver {
    /// Create a driver with a freshly generated world.
    ///
    /// Without a `seed` the generator is seeded from the OS.
    pub fn new(cfg: Config, seed: Option<u64>) -> Result<Self> {
        cfg.validate().context("failed to validate config")?;

        let mut rng = match seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed),
            None => ChaCha12Rng::try_from_os_rng()?,
        };
        let sim = generate_world(&cfg, &mut rng).context("failed to generate world")?;
        Ok(Self {
            cfg,
            sim,
            rng,
            running: false,
        })
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Reset => {
                log::info!("resetting the world");
                self.running = false;
                self.sim = generate_world(&self.cfg, &mut self.rng)
                    .context("failed to generate world")?;
            }
            Action::Infect => match self.sim.seed_infection(&mut self.rng) {
                Ok(i_agt) => log::debug!("infected agent {i_agt}"),
                Err(SimError::NoHealthyAgents) => log::warn!("no healthy agents to infect"),
                Err(error) => return Err(error).context("failed to infect an agent"),
            },
            Action::Cure => {
                log::debug!("curing all agents");
                self.sim.clear_all_infections();
            }
            Action::Toggle => {
                self.running = !self.running;
                log::debug!("running: {}", self.running);
            }
        }
        Ok(())
    }

    /// Advance the simulation one tick if it is running.
    pub fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.sim.step_with(self.cfg.index.propagation, &mut self.rng);
        true
    }

    /// Tick `n_ticks` times, logging the counters periodically.
    pub fn run(&mut self, n_ticks: u64) -> RunSummary {
        let mut peak_infected = self.sim.count_infected();
        let mut ticks = 0;
        for _ in 0..n_ticks {
            if !self.tick() {
                break;
            }
            ticks += 1;

            let infected = self.sim.count_infected();
            peak_infected = peak_infected.max(infected);
            if self.sim.elapsed_ticks() % self.cfg.output.ticks_per_log == 0 {
                log::info!("tick {:>8} infected {infected:>6}", self.sim.elapsed_ticks());
            }
        }

        RunSummary {
            ticks,
            infected: self.sim.count_infected(),
            peak_infected,
        }
    }
}

fn generate_world<R: Rng + ?Sized>(cfg: &Config, rng: &mut R) -> Result<Simulation> {
    let sim = Simulation::with_params(
        cfg.world.width,
        cfg.world.height,
        cfg.world.n_agents,
        &cfg.sim_params(),
        rng,
    )?;
    Ok(sim)
}

/// Run the indexed and brute-force paths side by side from the same seed.
///
/// Returns the summaries of the indexed and brute-force runs, in that order.
pub fn compare(
    cfg: &Config,
    seed: u64,
    n_seeds: usize,
    n_ticks: u64,
) -> Result<(RunSummary, RunSummary)> {
    let mut summaries = Vec::with_capacity(2);
    for propagation in [Propagation::Indexed, Propagation::BruteForce] {
        let mut cfg = cfg.clone();
        cfg.index.propagation = propagation;
        let mut driver = Driver::new(cfg, Some(seed))?;
        for _ in 0..n_seeds {
            driver.apply(Action::Infect)?;
        }
        driver.apply(Action::Toggle)?;
        let summary = driver.run(n_ticks);
        log::info!("{propagation:?}: {summary:?}");
        summaries.push(summary);
    }

    let (indexed, bruteforce) = (summaries[0], summaries[1]);
    let diff = bruteforce.infected as i64 - indexed.infected as i64;
    log::info!("brute force minus indexed infected after {n_ticks} ticks: {diff}");
    Ok((indexed, bruteforce))
}
