//! Agent-based simulation of an infection spreading among agents that
//! wander a bounded plane, with a spatial hash for proximity detection.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod model;
pub mod spatial;

pub use crate::config::Config;
pub use crate::driver::{Action, Driver, RunSummary};
pub use crate::engine::{Propagation, SimParams, Simulation};
pub use crate::error::SimError;
pub use crate::model::{Agent, Bounds, Infection, Pathogen, Position};
pub use crate::spatial::SpatialIndex;
