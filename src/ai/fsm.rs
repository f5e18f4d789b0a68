//! Locomotion state machine
//!
//! Chooses the discrete movement phase of a creature once per tick from its
//! pursuit state, heading error, water state and slide state.
//!
//! # Rules
//!
//! Evaluated in priority order:
//!
//! 1. Eat (and the externally owned Die/Sleep) are held.
//! 2. A Jump ends only when its animation reports finished, landing in Run.
//! 3. An unfinished Jump is held with no overrides.
//! 4. Idle creatures walk.
//! 5. Pursuing creatures run when roughly facing their desired heading,
//!    otherwise walk.
//! 6. Water forces Swim.
//! 7. An active slide forces Slide.
//!
//! # Example
//!
//! ```ignore
//! let mut fsm = LocomotionFsm::new(Phase::Walk);
//! if let Transition::To(phase) = fsm.update(&input) {
//!     log::debug!("now {}", phase.name());
//! }
//! ```

use std::f32::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Slide time (ms) above which the slide overrides every other phase
pub const SLIDE_OVERRIDE_MS: f32 = 40.0;
/// Heading error (radians) within which a pursuing creature runs
pub const RUN_ALIGNMENT: f32 = 1.0;

// ============================================================================
// Phase
// ============================================================================

/// Discrete locomotion/animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    Run,
    #[default]
    Walk,
    Swim,
    Slide,
    Jump,
    Eat,
    /// Set externally; never entered by the controller.
    Die,
    /// Set externally; never entered by the controller.
    Sleep,
}

impl Phase {
    /// Phase name for debugging and logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Run => "Run",
            Self::Walk => "Walk",
            Self::Swim => "Swim",
            Self::Slide => "Slide",
            Self::Jump => "Jump",
            Self::Eat => "Eat",
            Self::Die => "Die",
            Self::Sleep => "Sleep",
        }
    }

    /// Phases with no exit condition owned by the controller.
    #[must_use]
    pub const fn is_held(self) -> bool {
        matches!(self, Self::Eat | Self::Die | Self::Sleep)
    }

    /// Slow gaits turn at a reduced rate.
    #[must_use]
    pub const fn is_slow_gait(self) -> bool {
        matches!(self, Self::Walk | Self::Swim)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Pursuit State
// ============================================================================

/// Whether the creature wanders or chases its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PursuitState {
    /// Wandering between randomly picked destinations.
    #[default]
    Idle,
    /// Actively heading for a target.
    Pursuing,
    /// One-shot request to re-check the phase; becomes `Pursuing` once consumed.
    ForceReassess,
}

impl PursuitState {
    /// Whether the creature is chasing (including a pending reassess).
    #[must_use]
    pub const fn is_pursuing(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Consume a pending reassess request.
    ///
    /// A Jump in progress keeps the request pending. Returns `true` when a
    /// request was consumed.
    pub fn consume_reassess(&mut self, jumping: bool) -> bool {
        if *self == Self::ForceReassess && !jumping {
            *self = Self::Pursuing;
            return true;
        }
        false
    }
}

// ============================================================================
// Transition
// ============================================================================

/// Outcome of one state machine update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Stay in the current phase.
    None,
    /// Moved to a new phase.
    To(Phase),
}

// ============================================================================
// State Machine
// ============================================================================

/// Everything the rules read on a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocomotionInput {
    /// The animation subsystem finished a cycle this tick
    pub animation_finished: bool,
    /// Current pursuit state
    pub pursuit: PursuitState,
    /// Current heading (radians)
    pub heading: f32,
    /// Heading the steering wants this tick (radians)
    pub desired_heading: f32,
    /// Standing in deep water
    pub on_water: bool,
    /// Remaining slide time (ms)
    pub slide_timer: f32,
}

/// Priority-ordered locomotion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocomotionFsm {
    current: Phase,
}

impl LocomotionFsm {
    /// Create a state machine in the given phase.
    #[must_use]
    pub const fn new(initial: Phase) -> Self {
        Self { current: initial }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.current
    }

    /// Check if the machine is in the given phase.
    #[must_use]
    pub fn is_in(&self, phase: Phase) -> bool {
        self.current == phase
    }

    /// Apply the rules to the current phase without changing it.
    #[must_use]
    pub fn evaluate(&self, input: &LocomotionInput) -> Phase {
        let previous = self.current;

        if previous.is_held() {
            return previous;
        }

        let base = if previous == Phase::Jump {
            if !input.animation_finished {
                return Phase::Jump;
            }
            Phase::Run
        } else if !input.pursuit.is_pursuing() {
            Phase::Walk
        } else {
            let error = (input.desired_heading - input.heading).abs();
            if error < RUN_ALIGNMENT || error > TAU - RUN_ALIGNMENT {
                Phase::Run
            } else {
                Phase::Walk
            }
        };

        if input.slide_timer > SLIDE_OVERRIDE_MS {
            Phase::Slide
        } else if input.on_water {
            Phase::Swim
        } else {
            base
        }
    }

    /// Run the rules and move to the resulting phase.
    pub fn update(&mut self, input: &LocomotionInput) -> Transition {
        let next = self.evaluate(input);
        if next == self.current {
            return Transition::None;
        }
        self.current = next;
        Transition::To(next)
    }

    /// Force a phase, bypassing the rules (jump and eat starts, host overrides).
    pub fn force(&mut self, phase: Phase) -> Transition {
        if phase == self.current {
            return Transition::None;
        }
        self.current = phase;
        Transition::To(phase)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pursuing(heading: f32, desired: f32) -> LocomotionInput {
        LocomotionInput {
            pursuit: PursuitState::Pursuing,
            heading,
            desired_heading: desired,
            ..Default::default()
        }
    }

    #[test]
    fn test_idle_walks() {
        let mut fsm = LocomotionFsm::new(Phase::Run);
        let input = LocomotionInput::default();

        assert_eq!(fsm.update(&input), Transition::To(Phase::Walk));
        assert_eq!(fsm.update(&input), Transition::None);
    }

    #[test]
    fn test_pursuit_runs_when_aligned() {
        let mut fsm = LocomotionFsm::new(Phase::Walk);

        fsm.update(&pursuing(1.0, 1.5));
        assert!(fsm.is_in(Phase::Run));

        fsm.update(&pursuing(1.0, 2.5));
        assert!(fsm.is_in(Phase::Walk));
    }

    #[test]
    fn test_pursuit_alignment_wraps() {
        let fsm = LocomotionFsm::new(Phase::Walk);

        // 0.1 and 6.2 are 0.18 rad apart across zero
        assert_eq!(fsm.evaluate(&pursuing(0.1, 6.2)), Phase::Run);
        assert_eq!(fsm.evaluate(&pursuing(6.2, 0.1)), Phase::Run);
    }

    #[test]
    fn test_force_reassess_counts_as_pursuit() {
        let fsm = LocomotionFsm::new(Phase::Walk);
        let input = LocomotionInput {
            pursuit: PursuitState::ForceReassess,
            heading: 2.0,
            desired_heading: 2.0,
            ..Default::default()
        };

        assert_eq!(fsm.evaluate(&input), Phase::Run);
    }

    #[test]
    fn test_water_overrides_run() {
        let mut fsm = LocomotionFsm::new(Phase::Run);
        let input = LocomotionInput {
            on_water: true,
            ..pursuing(1.0, 1.0)
        };

        assert_eq!(fsm.update(&input), Transition::To(Phase::Swim));
    }

    #[test]
    fn test_slide_overrides_everything_but_held_and_jump() {
        let slide = LocomotionInput {
            on_water: true,
            slide_timer: 300.0,
            ..pursuing(1.0, 1.0)
        };

        assert_eq!(LocomotionFsm::new(Phase::Run).evaluate(&slide), Phase::Slide);
        assert_eq!(LocomotionFsm::new(Phase::Eat).evaluate(&slide), Phase::Eat);
        assert_eq!(LocomotionFsm::new(Phase::Jump).evaluate(&slide), Phase::Jump);
    }

    #[test]
    fn test_slide_threshold() {
        let fsm = LocomotionFsm::new(Phase::Run);
        let short = LocomotionInput {
            slide_timer: SLIDE_OVERRIDE_MS,
            ..pursuing(1.0, 1.0)
        };

        assert_eq!(fsm.evaluate(&short), Phase::Run);
    }

    #[test]
    fn test_jump_held_until_animation_finished() {
        let mut fsm = LocomotionFsm::new(Phase::Jump);

        for input in [
            LocomotionInput::default(),
            pursuing(0.0, 3.0),
            LocomotionInput {
                on_water: true,
                ..Default::default()
            },
        ] {
            assert_eq!(fsm.update(&input), Transition::None);
            assert!(fsm.is_in(Phase::Jump));
        }
    }

    #[test]
    fn test_jump_lands_in_run() {
        let mut fsm = LocomotionFsm::new(Phase::Jump);
        let input = LocomotionInput {
            animation_finished: true,
            ..Default::default()
        };

        assert_eq!(fsm.update(&input), Transition::To(Phase::Run));
    }

    #[test]
    fn test_eat_held() {
        let mut fsm = LocomotionFsm::new(Phase::Eat);
        let input = LocomotionInput {
            animation_finished: true,
            ..pursuing(0.0, 0.0)
        };

        assert_eq!(fsm.update(&input), Transition::None);
        assert!(fsm.is_in(Phase::Eat));
    }

    #[test]
    fn test_forced_transition() {
        let mut fsm = LocomotionFsm::new(Phase::Walk);

        assert_eq!(fsm.force(Phase::Jump), Transition::To(Phase::Jump));
        assert_eq!(fsm.force(Phase::Jump), Transition::None);
        assert_eq!(fsm.phase(), Phase::Jump);
    }

    #[test]
    fn test_consume_reassess() {
        let mut state = PursuitState::ForceReassess;
        assert!(!state.consume_reassess(true));
        assert_eq!(state, PursuitState::ForceReassess);

        assert!(state.consume_reassess(false));
        assert_eq!(state, PursuitState::Pursuing);
        assert!(!state.consume_reassess(false));

        let mut idle = PursuitState::Idle;
        assert!(!idle.consume_reassess(false));
        assert_eq!(idle, PursuitState::Idle);
    }
}
