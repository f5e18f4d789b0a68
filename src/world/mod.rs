//! World collaborators consumed by the creature controller
//!
//! Terrain heights, obstacle queries with the movement primitive, and the
//! random source. All queries are synchronous and side-effect free.

mod obstacles;
mod rng;
mod terrain;

pub use obstacles::{ObstacleGrid, ObstacleMap};
pub use rng::RandomSource;
pub use terrain::{HeightField, Terrain};
