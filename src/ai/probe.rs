//! Obstacle probing and the angular path search
//!
//! Instead of planning a full route, a creature checks a short corridor ahead
//! along a heading and, when that corridor is obstructed, sweeps alternating
//! left/right offsets until it finds the least obstructed direction.

use glam::Vec3;

use super::angle::heading_vector;
use crate::world::ObstacleMap;

/// Samples taken along a probed heading
pub const PROBE_SAMPLES: u32 = 20;
/// Distance between probe samples in world units
pub const PROBE_STRIDE: f32 = 64.0;
/// Angular widening per sweep step (15°)
pub const SWEEP_STEP: f32 = 15.0 * std::f32::consts::PI / 180.0;
/// Sweep steps on each side (12 × 15° = 180°)
pub const SWEEP_STEPS: u32 = 12;
/// Penalized score a sweep candidate must beat to become the running best
pub const NO_WAY_SCORE: u32 = 16;

/// Count blocked samples along a heading (0 = fully clear)
pub fn probe(
    origin: Vec3,
    heading: f32,
    blocked_by_water: bool,
    blocked_by_models: bool,
    obstacles: &dyn ObstacleMap,
) -> u32 {
    let step = heading_vector(heading) * PROBE_STRIDE;
    let step = Vec3::new(step.x, 0.0, step.y);

    (1..=PROBE_SAMPLES)
        .filter(|&i| {
            let point = origin + step * i as f32;
            obstacles.is_blocked(point, blocked_by_water, blocked_by_models)
        })
        .count() as u32
}

/// Result of a heading search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathChoice {
    /// Heading to steer toward this tick (not normalized)
    pub heading: f32,
    /// Penalized score of the chosen heading
    pub score: u32,
    /// Whether the desired heading itself was clear
    pub direct: bool,
}

/// Find the least obstructed heading near `desired`
///
/// `blocked_count` is reset when the direct heading is clear and incremented
/// otherwise. Candidates deviate by 15°, 30°, ... on alternating sides; each
/// carries a penalty of `step / 2` so closer deviations win ties.
pub fn find_heading(
    origin: Vec3,
    desired: f32,
    blocked_by_water: bool,
    blocked_by_models: bool,
    obstacles: &dyn ObstacleMap,
    blocked_count: &mut u32,
) -> PathChoice {
    let score_of = |heading: f32| {
        probe(origin, heading, blocked_by_water, blocked_by_models, obstacles)
    };

    if score_of(desired) == 0 {
        *blocked_count = 0;
        return PathChoice {
            heading: desired,
            score: 0,
            direct: true,
        };
    }

    *blocked_count += 1;

    let mut best = PathChoice {
        heading: desired + SWEEP_STEP,
        score: NO_WAY_SCORE,
        direct: false,
    };

    for i in 0..SWEEP_STEPS {
        let offset = SWEEP_STEP * (i + 1) as f32;
        for heading in [desired + offset, desired - offset] {
            let score = score_of(heading) + i / 2;
            if score == 0 {
                log::trace!("path sweep accepted clear heading {heading:.3} at step {i}");
                return PathChoice {
                    heading,
                    score,
                    direct: false,
                };
            }
            if score < best.score {
                best = PathChoice {
                    heading,
                    score,
                    direct: false,
                };
            }
        }
    }

    log::trace!(
        "path sweep settled on {:.3} with score {}",
        best.heading,
        best.score
    );
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::angle::{normalize, shortest_arc};
    use crate::world::ObstacleGrid;
    use std::f32::consts::PI;

    /// Predicate that blocks headings inside a set of angular wedges around an origin
    struct Wedges {
        origin: Vec3,
        /// (center heading, half width) pairs
        wedges: Vec<(f32, f32)>,
    }

    impl ObstacleMap for Wedges {
        fn is_blocked(&self, point: Vec3, _water: bool, _models: bool) -> bool {
            let d = point - self.origin;
            let heading = normalize(d.x.atan2(d.z));
            self.wedges
                .iter()
                .any(|&(center, half)| shortest_arc(heading, center) <= half)
        }

        fn is_blocked_for_placement(&self, _point: Vec3) -> bool {
            false
        }
    }

    /// Predicate that blocks everything
    struct Solid;

    impl ObstacleMap for Solid {
        fn is_blocked(&self, _point: Vec3, _water: bool, _models: bool) -> bool {
            true
        }

        fn is_blocked_for_placement(&self, _point: Vec3) -> bool {
            true
        }
    }

    fn origin() -> Vec3 {
        Vec3::new(10_000.0, 0.0, 10_000.0)
    }

    #[test]
    fn test_probe_clear() {
        let grid = ObstacleGrid::new(4, 4, 256.0);
        assert_eq!(probe(origin(), 1.0, true, true, &grid), 0);
    }

    #[test]
    fn test_probe_counts_blocked_samples() {
        let mut grid = ObstacleGrid::new(64, 64, 256.0);
        // Heading 0 walks +Z; block cells 41+ (z >= 10_496)
        grid.block_where(|center| center.y > 10_500.0);
        let from = Vec3::new(10_000.0, 0.0, 10_000.0);

        // Samples at z = 10_064 .. 11_280
        let score = probe(from, 0.0, false, true, &grid);
        let expected = (1..=PROBE_SAMPLES)
            .filter(|&i| 10_000.0 + 64.0 * i as f32 >= 10_496.0)
            .count() as u32;
        assert_eq!(score, expected);
        assert!(score > 0 && score < PROBE_SAMPLES);

        // Water does not matter when models are ignored
        assert_eq!(probe(from, 0.0, true, false, &grid), 0);
    }

    #[test]
    fn test_direct_heading_clear_resets_count() {
        let grid = ObstacleGrid::new(4, 4, 256.0);
        let mut blocked = 7;

        let choice = find_heading(origin(), 2.0, false, true, &grid, &mut blocked);

        assert!(choice.direct);
        assert_eq!(choice.heading, 2.0);
        assert_eq!(blocked, 0);
    }

    #[test]
    fn test_clear_direct_never_increments() {
        let grid = ObstacleGrid::new(4, 4, 256.0);
        let mut blocked = 0;

        for i in 0..20 {
            find_heading(origin(), i as f32 * 0.3, false, true, &grid, &mut blocked);
            assert_eq!(blocked, 0);
        }
    }

    #[test]
    fn test_sweep_finds_nearest_clear_side() {
        // Block a 20° wedge around heading 1.0: +15° is still inside, +30° is clear
        let map = Wedges {
            origin: origin(),
            wedges: vec![(1.0, 20f32.to_radians())],
        };
        let mut blocked = 0;

        let choice = find_heading(origin(), 1.0, false, true, &map, &mut blocked);

        assert_eq!(blocked, 1);
        assert!(!choice.direct);
        assert_eq!(choice.score, 0);
        // Step 1 (30°) tries the positive side first
        assert!((choice.heading - (1.0 + 2.0 * SWEEP_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_sweep_prefers_negative_side_when_positive_blocked() {
        let map = Wedges {
            origin: origin(),
            wedges: vec![(1.0, 5f32.to_radians()), (1.0 + SWEEP_STEP, 5f32.to_radians())],
        };
        let mut blocked = 0;

        let choice = find_heading(origin(), 1.0, false, true, &map, &mut blocked);

        assert_eq!(choice.score, 0);
        assert!((choice.heading - (1.0 - SWEEP_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_fully_blocked_defaults_to_first_offset() {
        let mut blocked = 12;

        let choice = find_heading(origin(), 0.5, false, true, &Solid, &mut blocked);

        assert_eq!(blocked, 13);
        assert_eq!(choice.score, NO_WAY_SCORE);
        assert!((choice.heading - (0.5 + SWEEP_STEP)).abs() < 1e-6);
    }

    #[test]
    fn test_penalty_tie_keeps_first_found() {
        // Everything but a gap behind the creature is blocked; far candidates
        // carry large penalties but the gap still wins with a lower total.
        let map = Wedges {
            origin: origin(),
            wedges: vec![(0.0, PI - 10f32.to_radians())],
        };
        let mut blocked = 0;

        let choice = find_heading(origin(), 0.0, false, true, &map, &mut blocked);

        // Step 11 (180°) is the only clear candidate: penalized score 5.
        // Both +180° and -180° score 5; strict less-than keeps the first (+180°).
        assert_eq!(choice.score, 5);
        assert!((choice.heading - PI).abs() < 1e-5);
    }
}
