// driver.rs - Run/stop lifecycle for the stepping loop
//
// The driver never owns a timer. Each cycle reports whether a successor should
// be scheduled, and whoever owns the timer acts on that answer.

use std::time::Duration;

use log::{debug, trace, warn};

use crate::error::GridError;
use crate::grid::Grid;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// What the timer owner should do once a cycle has published its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// Still running: run the next cycle after this delay.
    Reschedule(Duration),
    /// Stopped while the cycle was in flight: schedule nothing.
    Halt,
}

#[derive(Debug, Clone)]
pub struct SimulationDriver {
    state: RunState,
    delay: Duration,
}

impl SimulationDriver {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: RunState::Stopped,
            delay,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Stopped -> Running. Returns `false` (and does nothing) if already running;
    /// on `true` the caller runs the first cycle immediately.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        debug!("Simulation driver: Stopped -> Running");
        self.state = RunState::Running;
        true
    }

    /// Running -> Stopped. Returns `false` if it was already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        debug!("Simulation driver: Running -> Stopped");
        self.state = RunState::Stopped;
        true
    }

    /// One step cycle with the standard rules.
    pub fn run_cycle(&mut self, grid: &Grid) -> Result<(Grid, Cycle), GridError> {
        self.run_cycle_with(grid, |g| Ok(g.step()))
    }

    /// One step cycle with a caller-supplied step function.
    ///
    /// The step is computed first; the running state is checked only afterwards,
    /// right before deciding on a successor. A failed step stops the driver.
    pub fn run_cycle_with<F>(&mut self, grid: &Grid, step: F) -> Result<(Grid, Cycle), GridError>
    where
        F: FnOnce(&Grid) -> Result<Grid, GridError>,
    {
        let next = match step(grid) {
            Ok(next) => next,
            Err(e) => {
                warn!("Step failed, stopping simulation: {e}");
                self.state = RunState::Stopped;
                return Err(e);
            }
        };

        let cycle = match self.state {
            RunState::Running => Cycle::Reschedule(self.delay),
            RunState::Stopped => Cycle::Halt,
        };
        trace!("Cycle complete ({} live), next: {:?}", next.population(), cycle);
        Ok((next, cycle))
    }
}
