// lib.rs - Conway's Game of Life simulation core

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod simulation;

pub use config::LifeConfig;
pub use driver::{Cycle, RunState, SimulationDriver};
pub use engine::{Engine, EngineHandle, spawn_engine_thread};
pub use error::{EngineError, GridError};
pub use grid::{Cell, Grid};
pub use patterns::{PATTERNS, Pattern};
pub use simulation::{Intent, Schedule, Simulation, Snapshot};
