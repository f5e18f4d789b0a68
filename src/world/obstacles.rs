//! Obstacle queries and the collision-aware movement primitive
//!
//! `ObstacleGrid` is a simple cell map of static models (rocks, trees) plus a
//! water mask, bounded by the playable map area.

use glam::{Vec2, Vec3};

use crate::ai::{MAP_MAX, MAP_MIN};

/// Read-only collision service
pub trait ObstacleMap {
    /// General movement/probe collision
    fn is_blocked(&self, point: Vec3, blocked_by_water: bool, blocked_by_models: bool) -> bool;

    /// Collision used only when choosing a destination (ignores models)
    fn is_blocked_for_placement(&self, point: Vec3) -> bool;

    /// Apply a horizontal displacement, backing off when the destination is blocked
    ///
    /// A blocked full move is retried at half length, then along each axis alone.
    /// Returns the new position; Y is left untouched.
    fn move_with_collision(
        &self,
        from: Vec3,
        delta: Vec2,
        blocked_by_water: bool,
        blocked_by_models: bool,
    ) -> Vec3 {
        if delta == Vec2::ZERO {
            return from;
        }

        let candidates = [
            delta,
            delta * 0.5,
            Vec2::new(delta.x, 0.0),
            Vec2::new(0.0, delta.y),
        ];

        candidates
            .into_iter()
            .filter(|step| *step != Vec2::ZERO)
            .map(|step| from + Vec3::new(step.x, 0.0, step.y))
            .find(|&to| !self.is_blocked(to, blocked_by_water, blocked_by_models))
            .unwrap_or(from)
    }
}

/// A 2D obstacle grid over the XZ plane
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    /// Width in cells
    pub width: usize,
    /// Depth in cells
    pub depth: usize,
    /// Cell size in world units
    pub cell_size: f32,
    /// World origin offset
    pub origin: Vec2,
    /// Cells occupied by static models
    models: Vec<bool>,
    /// Cells covered by water
    water: Vec<bool>,
}

impl ObstacleGrid {
    /// Create a new grid (all cells clear)
    #[must_use]
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Self {
        Self {
            width,
            depth,
            cell_size,
            models: vec![false; width * depth],
            water: vec![false; width * depth],
            origin: Vec2::ZERO,
        }
    }

    /// Mark a cell as occupied by a model
    pub fn set_blocked(&mut self, x: usize, z: usize, blocked: bool) {
        if x < self.width && z < self.depth {
            self.models[z * self.width + x] = blocked;
        }
    }

    /// Mark a cell as water
    pub fn set_water(&mut self, x: usize, z: usize, water: bool) {
        if x < self.width && z < self.depth {
            self.water[z * self.width + x] = water;
        }
    }

    /// Block every cell whose center satisfies the predicate
    pub fn block_where(&mut self, mut predicate: impl FnMut(Vec2) -> bool) {
        for z in 0..self.depth {
            for x in 0..self.width {
                if predicate(self.grid_to_world(x, z)) {
                    self.models[z * self.width + x] = true;
                }
            }
        }
    }

    /// Derive the water mask from a depth query at each cell center
    pub fn mark_water_where(&mut self, mut predicate: impl FnMut(Vec2) -> bool) {
        for z in 0..self.depth {
            for x in 0..self.width {
                let water = predicate(self.grid_to_world(x, z));
                self.water[z * self.width + x] = water;
            }
        }
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> (i32, i32) {
        let local = pos - self.origin;
        (
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
        )
    }

    /// Convert grid coordinates to world position (center of cell)
    #[must_use]
    pub fn grid_to_world(&self, x: usize, z: usize) -> Vec2 {
        self.origin
            + Vec2::new(
                (x as f32 + 0.5) * self.cell_size,
                (z as f32 + 0.5) * self.cell_size,
            )
    }

    fn cell_index(&self, point: Vec3) -> Option<usize> {
        let (x, z) = self.world_to_grid(Vec2::new(point.x, point.z));
        if x < 0 || z < 0 {
            return None;
        }
        let (x, z) = (x as usize, z as usize);
        (x < self.width && z < self.depth).then(|| z * self.width + x)
    }

    fn outside_map(point: Vec3) -> bool {
        point.x < MAP_MIN || point.x > MAP_MAX || point.z < MAP_MIN || point.z > MAP_MAX
    }
}

impl ObstacleMap for ObstacleGrid {
    fn is_blocked(&self, point: Vec3, blocked_by_water: bool, blocked_by_models: bool) -> bool {
        if Self::outside_map(point) {
            return true;
        }
        // Off-grid space inside the map is open ground
        let Some(index) = self.cell_index(point) else {
            return false;
        };
        (blocked_by_models && self.models[index]) || (blocked_by_water && self.water[index])
    }

    fn is_blocked_for_placement(&self, point: Vec3) -> bool {
        if Self::outside_map(point) {
            return true;
        }
        self.cell_index(point).is_some_and(|index| self.water[index])
    }
}
