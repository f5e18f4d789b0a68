//! Core simulation module
//!
//! Contains the herd simulation, its configuration, scene files and events

mod events;
mod scene;
mod simulation;

pub use events::{CreatureEvent, EventQueue};
pub use scene::{CreatureSpawn, HerdScene, SceneError};
pub use simulation::{Simulation, SimulationConfig};
