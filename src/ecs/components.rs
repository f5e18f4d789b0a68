//! Creature components

use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ai::angle::{heading_vector, normalize};

/// Creature body pose: where it stands and how it is oriented
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,
    /// Yaw in radians, kept in `[0, 2π)`; 0 faces +Z
    pub heading: f32,
    /// Roll into turns (radians)
    pub lean: f32,
    /// Pitch following the ground (radians, positive nose up)
    pub tilt: f32,
    /// World-to-model size multiplier
    pub scale: f32,
}

impl Pose {
    /// Create a pose at a position facing a heading
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self {
            position,
            heading: normalize(heading),
            ..Default::default()
        }
    }

    /// Set the size multiplier (non-positive values fall back to 1)
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale > 0.0 { scale } else { 1.0 };
        self
    }

    /// Position on the XZ plane
    pub fn xz(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Horizontal forward direction
    pub fn forward(&self) -> Vec3 {
        let v = heading_vector(self.heading);
        Vec3::new(v.x, 0.0, v.y)
    }

    /// Orientation combining heading, tilt and lean
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.heading, -self.tilt, self.lean)
    }

    /// Model matrix for a renderer
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation(),
            self.position,
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            heading: 0.0,
            lean: 0.0,
            tilt: 0.0,
            scale: 1.0,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_pose_normalizes_heading() {
        let pose = Pose::new(Vec3::ZERO, -FRAC_PI_2);
        assert!((pose.heading - 3.0 * FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_matches_forward() {
        let pose = Pose::new(Vec3::ZERO, 1.2);
        let rotated = pose.rotation() * Vec3::Z;

        assert!((rotated - pose.forward()).length() < 1e-5);
    }

    #[test]
    fn test_tilt_raises_nose() {
        let pose = Pose {
            tilt: 0.3,
            ..Pose::new(Vec3::ZERO, 0.0)
        };
        let nose = pose.rotation() * Vec3::Z;

        assert!(nose.y > 0.2);
    }

    #[test]
    fn test_matrix_places_model() {
        let pose = Pose::new(Vec3::new(10.0, 2.0, -4.0), 0.0).with_scale(2.0);
        let corner = pose.matrix().transform_point3(Vec3::X);

        assert!((corner - Vec3::new(12.0, 2.0, -4.0)).length() < 1e-5);
        assert_eq!(Pose::default().with_scale(-1.0).scale, 1.0);
    }
}
