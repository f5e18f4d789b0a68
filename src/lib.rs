//! Creature locomotion AI for a 3D wildlife simulation
//!
//! This crate provides:
//! - Per-creature decision making: destinations, obstacle avoidance, gaits
//! - Rate-limited steering with slides, lean and terrain following
//! - Entity Component System (ECS) herd simulation with hecs
//! - RON/JSON scene and species files

pub mod ai;
pub mod animation;
pub mod core;
pub mod ecs;
pub mod world;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{
        CreatureBrain, Phase, PursuitState, SharedSpecies, SpeciesPolicy, SpeciesProfile,
        SpeciesRegistry, ThinkContext, ThinkReport, Transition,
    };
    pub use crate::animation::{Animator, ClipInfo, ClipLibrary, ClipPlayer};
    pub use crate::core::{
        CreatureEvent, CreatureSpawn, EventQueue, HerdScene, SceneError, Simulation,
        SimulationConfig,
    };
    pub use crate::ecs::{Name, Pose};
    pub use crate::world::{HeightField, ObstacleGrid, ObstacleMap, RandomSource, Terrain};
    pub use glam::{Vec2, Vec3};
}
