//! Heading arithmetic
//!
//! Headings are radians in `[0, 2π)`. Heading 0 faces +Z and headings grow
//! toward +X, so the unit vector for heading `a` is `(sin a, cos a)` on XZ.

use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Wrap an angle into `[0, 2π)`
///
/// Non-finite input maps to 0.
#[must_use]
pub fn normalize(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Heading bisecting the shorter arc between two headings
#[must_use]
pub fn circular_mean(a: f32, b: f32) -> f32 {
    let mean = (a + b) * 0.5;
    if (a - b).abs() < PI {
        normalize(mean)
    } else {
        normalize(mean + PI)
    }
}

/// Angular distance between two headings along the shorter arc, in `[0, π]`
#[must_use]
pub fn shortest_arc(a: f32, b: f32) -> f32 {
    let error = normalize(a - b);
    error.min(TAU - error)
}

/// Unit XZ vector for a heading
#[must_use]
pub fn heading_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}

/// Heading of the vector from `from` to `to`, or `None` when they coincide
#[must_use]
pub fn bearing(from: Vec2, to: Vec2) -> Option<f32> {
    let delta = to - from;
    if delta.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(normalize(delta.x.atan2(delta.y)))
}
