// simulation.rs - Intent dispatch over the current grid and run state

use std::time::Duration;

use log::{debug, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::LifeConfig;
use crate::driver::{Cycle, SimulationDriver};
use crate::error::GridError;
use crate::grid::Grid;
use crate::patterns::Pattern;

/// A user request coming from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    ToggleCell { row: usize, col: usize },
    Randomize,
    Clear,
    Start,
    Stop,
    LoadPattern(&'static Pattern),
}

/// What the timer owner should do with the pending step timer after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Leave any armed timer as it is.
    Keep,
    /// (Re)arm the timer to fire after this delay.
    Arm(Duration),
    /// Disarm the timer.
    Cancel,
}

impl From<Cycle> for Schedule {
    fn from(cycle: Cycle) -> Self {
        match cycle {
            Cycle::Reschedule(delay) => Schedule::Arm(delay),
            Cycle::Halt => Schedule::Cancel,
        }
    }
}

/// Published state, handed to listeners after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: Grid,
    pub running: bool,
    pub generation: u64,
}

type Listener = Box<dyn FnMut(&Snapshot) + Send>;
type Stepper = Box<dyn FnMut(&Grid) -> Result<Grid, GridError> + Send>;

pub struct Simulation {
    grid: Grid,
    driver: SimulationDriver,
    generation: u64,
    live_probability: f64,
    rng: StdRng,
    stepper: Stepper,
    listeners: Vec<Listener>,
}

impl Simulation {
    pub fn new(config: &LifeConfig) -> Result<Self, GridError> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &LifeConfig, rng: StdRng) -> Result<Self, GridError> {
        let grid = Grid::new(config.rows, config.cols)?;
        debug!("New {}x{} simulation, step delay {:?}", config.rows, config.cols, config.step_delay());
        Ok(Self {
            grid,
            driver: SimulationDriver::new(config.step_delay()),
            generation: 0,
            live_probability: config.live_probability,
            rng,
            stepper: Box::new(|grid: &Grid| Ok::<_, GridError>(grid.step())),
            listeners: Vec::new(),
        })
    }

    /// Replaces the step function used by every cycle.
    #[cfg(test)]
    pub(crate) fn set_stepper<F>(&mut self, stepper: F)
    where
        F: FnMut(&Grid) -> Result<Grid, GridError> + Send + 'static,
    {
        self.stepper = Box::new(stepper);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            running: self.is_running(),
            generation: self.generation,
        }
    }

    /// Registers a change listener; it runs after every grid or running-flag update.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Snapshot) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Applies one intent. A rejected intent leaves the state unchanged.
    pub fn dispatch(&mut self, intent: Intent) -> Result<Schedule, GridError> {
        match intent {
            Intent::ToggleCell { row, col } => {
                self.grid = self.grid.toggle_cell(row, col)?;
                self.publish();
                Ok(Schedule::Keep)
            }
            Intent::Randomize => {
                let next = self.grid.randomize(self.live_probability, &mut self.rng);
                self.replace(next);
                Ok(Schedule::Keep)
            }
            Intent::Clear => {
                let next = self.grid.clear();
                self.replace(next);
                Ok(Schedule::Keep)
            }
            Intent::LoadPattern(pattern) => {
                let next = pattern.place(self.grid.rows(), self.grid.cols())?;
                debug!("Loaded pattern '{}'", pattern.name);
                self.replace(next);
                Ok(Schedule::Keep)
            }
            Intent::Start => {
                if self.driver.start() {
                    self.cycle()
                } else {
                    Ok(Schedule::Keep)
                }
            }
            Intent::Stop => {
                if self.driver.stop() {
                    self.publish();
                }
                Ok(Schedule::Cancel)
            }
        }
    }

    /// The step timer fired.
    pub fn tick(&mut self) -> Result<Schedule, GridError> {
        if !self.driver.is_running() {
            return Ok(Schedule::Cancel);
        }
        self.cycle()
    }

    fn cycle(&mut self) -> Result<Schedule, GridError> {
        let stepper = &mut self.stepper;
        match self.driver.run_cycle_with(&self.grid, |grid| stepper(grid)) {
            Ok((next, cycle)) => {
                self.grid = next;
                self.generation += 1;
                self.publish();
                Ok(cycle.into())
            }
            Err(e) => {
                warn!("Generation {} failed: {e}", self.generation + 1);
                self.publish();
                Err(e)
            }
        }
    }

    // Seeding a new board restarts the generation count.
    fn replace(&mut self, grid: Grid) {
        self.grid = grid;
        self.generation = 0;
        self.publish();
    }

    fn publish(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}
