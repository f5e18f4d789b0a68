//! Steering integration for creature locomotion
//!
//! Turn rate, lean and forward speed chase their targets through rate-limited
//! ramps, so a creature never snaps between gaits or overshoots its heading.
//! A turn too sharp to make at speed starts a slide instead: the creature
//! skids along its old direction while it comes around.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::angle::{heading_vector, normalize, shortest_arc};
use super::fsm::Phase;
use super::species::SpeciesProfile;
use crate::ecs::Pose;
use crate::world::{ObstacleMap, Terrain};

/// Forward speed above which a sharp turn becomes a slide
pub const SLIDE_MIN_SPEED: f32 = 0.6;
/// Heading error (radians) that triggers a slide (120°)
pub const SLIDE_TRIGGER_ANGLE: f32 = TAU / 3.0;
/// Slide duration (ms) per unit of forward speed at onset
pub const SLIDE_DURATION_PER_SPEED: f32 = 700.0;
/// Slide displacement divisor: slide speed is `slide_timer / SLIDE_DECAY`
pub const SLIDE_DECAY: f32 = 600.0;
/// Run speed divisor while a slide is still active
pub const SLIDE_RUN_DIVISOR: f32 = 8.0;
/// Turn rate to radians-per-ms divisor
pub const TURN_TIME_SCALE: f32 = 1024.0;
/// How far below the water surface a swimming creature floats, per unit of scale
pub const SWIM_DEPTH: f32 = 200.0;

/// Move `current` toward `target` by at most `dt / damping`, never overshooting
///
/// Zero or negative `dt` and non-positive `damping` leave `current` unchanged.
#[must_use]
pub fn ramp_toward(current: f32, target: f32, dt: f32, damping: f32) -> f32 {
    if dt <= 0.0 || damping <= 0.0 {
        return current;
    }
    let step = dt / damping;
    if current < target {
        (current + step).min(target)
    } else {
        (current - step).max(target)
    }
}

/// Result of one steering tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutcome {
    /// Slide duration (ms) when a slide began this tick
    pub slide_started: Option<f32>,
    /// Target turn rate requested this tick
    pub target_turn_rate: f32,
    /// Target forward speed requested this tick
    pub target_speed: f32,
}

/// Rate-limited motion state of a creature
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Realized turn rate (signed)
    pub turn_rate: f32,
    /// Realized forward speed (units per ms before scale)
    pub forward_speed: f32,
    /// Remaining slide time (ms)
    pub slide_timer: f32,
    /// Unit XZ direction frozen at slide onset
    pub slide_direction: Vec2,
    /// Turn boost countdown; the host owns its lifecycle
    pub fear_timer: f32,
    /// In deep water; turns as slowly as a slow gait whatever the phase
    pub swimming: bool,
}

impl Motion {
    /// A slide is in progress
    #[must_use]
    pub fn is_sliding(&self) -> bool {
        self.slide_timer > 0.0
    }

    /// The fear boost is active
    #[must_use]
    pub fn is_afraid(&self) -> bool {
        self.fear_timer > 0.0
    }

    /// Signed turn rate the creature wants to reach `desired` from `heading`
    #[must_use]
    pub fn target_turn_rate(
        &self,
        heading: f32,
        desired: f32,
        phase: Phase,
        species: &SpeciesProfile,
    ) -> f32 {
        let turn = &species.turn;
        let error = (desired - heading).abs();
        let shortest = error.min(TAU - error);
        if shortest <= turn.dead_zone {
            return 0.0;
        }

        let direction = turn_direction(heading, desired);
        let mut rate = (turn.base_rate + turn.rate_gain * shortest) * direction;
        if self.is_afraid() {
            rate *= turn.fear_multiplier;
        }
        if (phase.is_slow_gait() || self.swimming) && turn.slow_gait_divisor > 0.0 {
            rate /= turn.slow_gait_divisor;
        }
        rate
    }

    /// Target forward speed for a phase at a given heading error
    #[must_use]
    pub fn target_speed(&self, phase: Phase, shortest: f32, species: &SpeciesProfile) -> f32 {
        let speed = species.speeds.for_phase(phase);

        if phase == Phase::Run && self.is_sliding() {
            let speed = speed / SLIDE_RUN_DIVISOR;
            return if shortest > FRAC_PI_2 {
                0.0
            } else if shortest > FRAC_PI_4 {
                speed * (FRAC_PI_2 - shortest) / FRAC_PI_4
            } else {
                speed
            };
        }

        if shortest > FRAC_PI_2 {
            speed * (PI - shortest).max(0.0) / FRAC_PI_2
        } else {
            speed
        }
    }

    /// Turn, lean and accelerate toward `desired` for one tick
    ///
    /// The slide check uses the heading error from before the turn.
    pub fn steer(
        &mut self,
        pose: &mut Pose,
        desired: f32,
        phase: Phase,
        species: &SpeciesProfile,
        dt: f32,
    ) -> SteeringOutcome {
        let turn = &species.turn;
        let error = (desired - pose.heading).abs();
        let shortest = error.min(TAU - error);

        let mut slide_started = None;
        if !self.is_sliding()
            && self.forward_speed > SLIDE_MIN_SPEED
            && phase != Phase::Jump
            && shortest > SLIDE_TRIGGER_ANGLE
        {
            self.slide_timer = self.forward_speed * SLIDE_DURATION_PER_SPEED;
            self.slide_direction = heading_vector(pose.heading);
            self.forward_speed = 0.0;
            slide_started = Some(self.slide_timer);
        }

        // Heading
        let target_turn_rate = self.target_turn_rate(pose.heading, desired, phase, species);
        let damping = if self.is_afraid() {
            turn.fear_damping
        } else {
            turn.damping
        };
        self.turn_rate = ramp_toward(self.turn_rate, target_turn_rate, dt, damping);

        let direction = turn_direction(pose.heading, desired);
        // A rate still pointing away (ramp crossing zero) holds the heading
        if self.turn_rate * direction > 0.0 {
            let step = self.turn_rate.abs() * dt / TURN_TIME_SCALE;
            pose.heading = if step >= shortest {
                normalize(desired)
            } else {
                normalize(pose.heading + direction * step)
            };
        }

        // Lean
        let lean_target = if target_turn_rate == 0.0 {
            0.0
        } else {
            (shortest / 2.0).min(turn.max_lean).copysign(target_turn_rate)
        };
        let lean_damping = if lean_target.abs() > pose.lean.abs() {
            turn.lean_grow_damping
        } else {
            turn.lean_settle_damping
        };
        pose.lean = ramp_toward(pose.lean, lean_target, dt, lean_damping);

        // Speed
        let target_speed = self.target_speed(phase, shortest_arc(pose.heading, desired), species);
        self.forward_speed = if phase == Phase::Jump {
            species.speeds.jump
        } else {
            ramp_toward(self.forward_speed, target_speed, dt, species.speed_damping)
        };

        SteeringOutcome {
            slide_started,
            target_turn_rate,
            target_speed,
        }
    }

    /// Move the creature by its forward speed and any active slide
    pub fn displace(
        &mut self,
        pose: &mut Pose,
        obstacles: &dyn ObstacleMap,
        species: &SpeciesProfile,
        dt: f32,
    ) {
        if dt <= 0.0 {
            return;
        }
        let water = species.blocked_by_water;
        let models = species.blocked_by_models;

        let forward = heading_vector(pose.heading) * self.forward_speed * dt * pose.scale;
        pose.position = obstacles.move_with_collision(pose.position, forward, water, models);

        if self.is_sliding() {
            let slide = self.slide_direction * (self.slide_timer / SLIDE_DECAY) * dt * pose.scale;
            pose.position = obstacles.move_with_collision(pose.position, slide, water, models);
            self.slide_timer = (self.slide_timer - dt).max(0.0);
        }
    }
}

/// +1 when `desired` is reached by increasing the heading along the short arc, else -1
fn turn_direction(heading: f32, desired: f32) -> f32 {
    let direction = if desired > heading { 1.0 } else { -1.0 };
    if (desired - heading).abs() > PI {
        -direction
    } else {
        direction
    }
}

/// Float on water or follow the ground
pub fn settle_vertical(pose: &mut Pose, terrain: &dyn Terrain, on_water: bool) {
    let (x, z) = (pose.position.x, pose.position.z);
    if on_water {
        pose.position.y = terrain.upper_height(x, z) - SWIM_DEPTH * pose.scale;
        pose.lean *= 0.5;
        pose.tilt = 0.0;
    } else {
        pose.position.y = terrain.height(x, z);
        pose.tilt = terrain.tilt(x, z, pose.heading);
    }
}
