//! Destination picking by constrained rejection sampling

use glam::{Vec2, Vec3};

use crate::world::{ObstacleMap, RandomSource, Terrain};

/// Lowest playable map coordinate on both axes
pub const MAP_MIN: f32 = 512.0;
/// Highest playable map coordinate on both axes
pub const MAP_MAX: f32 = 1018.0 * 256.0;

/// Attempts allowed to find a candidate that is not trivially close
pub const DISTANCE_RETRIES: u32 = 128;
/// Total attempts allowed, shared with the placement check
pub const TOTAL_RETRIES: u32 = 256;
/// Range growth applied each time a candidate reaches the placement check
pub const RANGE_WIDENING: f32 = 512.0;

/// Outcome of a target search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPick {
    /// Committed destination (Y from the terrain)
    pub position: Vec3,
    /// Samples drawn before committing
    pub attempts: u32,
    /// Search range after widening
    pub range: f32,
    /// Whether the committed point passed the placement check
    pub placement_clear: bool,
}

impl TargetPick {
    /// Destination on the XZ plane
    #[must_use]
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }
}

/// Pick a destination around `origin` within roughly `range` world units
///
/// Always commits a point: when both retry budgets run out the last sample is
/// returned with `placement_clear` reporting whether it is usable.
pub fn select_target(
    origin: Vec2,
    range: f32,
    terrain: &dyn Terrain,
    obstacles: &dyn ObstacleMap,
    rng: &mut dyn RandomSource,
) -> TargetPick {
    let mut range = range.max(0.0);
    let mut attempts = 0;

    loop {
        let reach = range as i32;
        let x = (origin.x + rng.uniform_signed_int(reach) as f32).clamp(MAP_MIN, MAP_MAX);
        let z = (origin.y + rng.uniform_signed_int(reach) as f32).clamp(MAP_MIN, MAP_MAX);
        let candidate = Vec3::new(x, terrain.height(x, z), z);
        attempts += 1;

        let displacement = (x - origin.x).abs() + (z - origin.y).abs();
        if attempts < DISTANCE_RETRIES && displacement < range / 2.0 {
            continue;
        }

        range += RANGE_WIDENING;

        let blocked = obstacles.is_blocked_for_placement(candidate);
        if attempts < TOTAL_RETRIES && blocked {
            continue;
        }

        return TargetPick {
            position: candidate,
            attempts,
            range,
            placement_clear: !blocked,
        };
    }
}
