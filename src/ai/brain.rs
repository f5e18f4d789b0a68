//! Per-creature decision making
//!
//! `CreatureBrain::think` runs once per creature per frame. It keeps a
//! destination, aims part way between the destination and the current heading,
//! routes that aim around obstacles, picks a locomotion phase and hands the
//! result to the steering integrator.

use std::sync::Arc;

use glam::Vec2;

use super::angle::{bearing, circular_mean, normalize};
use super::fsm::{LocomotionFsm, LocomotionInput, Phase, PursuitState, Transition};
use super::probe::find_heading;
use super::species::{SharedSpecies, SpeciesPolicy};
use super::steering::{Motion, settle_vertical};
use super::target::{TargetPick, select_target};
use crate::animation::Animator;
use crate::ecs::Pose;
use crate::world::{ObstacleMap, RandomSource, Terrain};

/// Target age (ms) after which a new destination is picked
pub const RETARGET_AGE_MS: f32 = 30_000.0;
/// Search range for age-based retargeting
pub const RETARGET_RANGE: f32 = 2048.0;
/// Distance at which a wandering creature counts as arrived
pub const ARRIVAL_DISTANCE: f32 = 456.0;
/// Search range for a wandering creature's next destination
pub const WANDER_RANGE: f32 = 8048.0;
/// Water depth per unit of scale above which a creature swims
pub const SWIM_THRESHOLD: f32 = 180.0;
/// Consecutive blocked ticks tolerated before aiming is suppressed
pub const BLOCKED_PATH_LIMIT: u32 = 12;
/// Minimum aim suppression (ticks)
pub const AIM_COOLDOWN_BASE: u32 = 16;
/// Random extra aim suppression (ticks, exclusive)
pub const AIM_COOLDOWN_SPREAD: u32 = 20;

/// Collaborators borrowed for one `think` call
pub struct ThinkContext<'a> {
    pub pose: &'a mut Pose,
    pub terrain: &'a dyn Terrain,
    pub obstacles: &'a dyn ObstacleMap,
    pub rng: &'a mut dyn RandomSource,
    pub animator: &'a mut dyn Animator,
}

/// Phase change observed during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
}

/// What happened during one `think` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThinkReport {
    /// Phase transition made by the state machine
    pub transition: Option<PhaseChange>,
    /// Clip handed to the animator
    pub clip: Option<String>,
    /// Destinations picked this tick, in order; the last one is current
    pub retargets: Vec<TargetPick>,
    /// Slide duration (ms), when a slide began
    pub slide_started: Option<f32>,
    /// Aim cooldown (ticks), when aiming was suppressed
    pub aim_suppressed: Option<u32>,
}

/// Locomotion controller state for one creature
#[derive(Debug, Clone)]
pub struct CreatureBrain {
    species: SharedSpecies,
    fsm: LocomotionFsm,
    pursuit: PursuitState,
    on_water: bool,
    target: Vec2,
    target_age: f32,
    desired_heading: f32,
    aim_cooldown: u32,
    blocked_path_count: u32,
    motion: Motion,
    /// A forced phase change still needs its clip
    redispatch: bool,
}

impl CreatureBrain {
    /// Create a wandering brain whose destination is its spawn point
    ///
    /// The first tick picks a real destination.
    #[must_use]
    pub fn new(species: SharedSpecies, pose: &Pose) -> Self {
        Self {
            species,
            fsm: LocomotionFsm::default(),
            pursuit: PursuitState::Idle,
            on_water: false,
            target: pose.xz(),
            target_age: 0.0,
            desired_heading: pose.heading,
            aim_cooldown: 0,
            blocked_path_count: 0,
            motion: Motion::default(),
            redispatch: true,
        }
    }

    /// Advance the creature by `dt` milliseconds
    pub fn think(&mut self, ctx: &mut ThinkContext<'_>, dt: f32) -> ThinkReport {
        let dt = dt.max(0.0);
        let species = Arc::clone(&self.species);
        let profile = species.profile();
        let mut report = ThinkReport::default();
        // Until a forced phase has sent its clip, the flag belongs to the old clip
        let finished = !self.redispatch && ctx.animator.animation_finished();

        self.target_age += dt;
        if self.target_age > RETARGET_AGE_MS {
            let pick = self.retarget(ctx, RETARGET_RANGE);
            report.retargets.push(pick);
        }

        let distance = self.target.distance(ctx.pose.xz());
        if self.pursuit == PursuitState::Idle && distance < ARRIVAL_DISTANCE {
            let pick = self.retarget(ctx, WANDER_RANGE);
            report.retargets.push(pick);
        }

        let (x, z) = (ctx.pose.position.x, ctx.pose.position.z);
        self.on_water = ctx.terrain.water_depth(x, z) > SWIM_THRESHOLD * ctx.pose.scale;
        self.motion.swimming = self.on_water;

        if self.fsm.is_in(Phase::Eat) {
            settle_vertical(ctx.pose, ctx.terrain, self.on_water);
            self.dispatch(ctx, finished, &mut report);
            return report;
        }

        if self.aim_cooldown > 0 {
            self.aim_cooldown -= 1;
        } else {
            let heading = ctx.pose.heading;
            let aim = bearing(ctx.pose.xz(), self.target).unwrap_or(heading);
            self.desired_heading = circular_mean(aim, heading);
        }

        let choice = find_heading(
            ctx.pose.position,
            self.desired_heading,
            profile.blocked_by_water,
            profile.blocked_by_models,
            ctx.obstacles,
            &mut self.blocked_path_count,
        );
        self.desired_heading = choice.heading;

        if self.blocked_path_count > BLOCKED_PATH_LIMIT {
            self.blocked_path_count = 0;
            self.aim_cooldown = AIM_COOLDOWN_BASE + ctx.rng.uniform_int(AIM_COOLDOWN_SPREAD);
            log::debug!(
                "path blocked for {} ticks, holding heading for {} ticks",
                BLOCKED_PATH_LIMIT + 1,
                self.aim_cooldown
            );
            report.aim_suppressed = Some(self.aim_cooldown);
        }

        self.desired_heading = normalize(self.desired_heading);

        // A jump that lands this tick no longer defers the reassess
        let jumping = self.fsm.is_in(Phase::Jump) && !finished;
        if self.pursuit.consume_reassess(jumping) {
            log::trace!("pursuit reassessed in {}", self.fsm.phase());
        }
        let input = LocomotionInput {
            animation_finished: finished,
            pursuit: self.pursuit,
            heading: ctx.pose.heading,
            desired_heading: self.desired_heading,
            on_water: self.on_water,
            slide_timer: self.motion.slide_timer,
        };
        let from = self.fsm.phase();
        if let Transition::To(to) = self.fsm.update(&input) {
            log::debug!("phase {from} -> {to}");
            report.transition = Some(PhaseChange { from, to });
        }
        let phase = self.fsm.phase();

        let outcome = self.motion.steer(ctx.pose, self.desired_heading, phase, profile, dt);
        if let Some(duration) = outcome.slide_started {
            log::debug!("slide started for {duration:.0} ms");
            report.slide_started = Some(duration);
        }
        self.motion.displace(ctx.pose, ctx.obstacles, profile, dt);
        settle_vertical(ctx.pose, ctx.terrain, self.on_water);

        self.dispatch(ctx, finished || report.transition.is_some(), &mut report);
        report
    }

    fn retarget(&mut self, ctx: &mut ThinkContext<'_>, range: f32) -> TargetPick {
        let pick = select_target(
            ctx.pose.xz(),
            range,
            ctx.terrain,
            ctx.obstacles,
            &mut *ctx.rng,
        );
        self.target = pick.xz();
        self.target_age = 0.0;

        if pick.placement_clear {
            log::debug!(
                "new target ({:.0}, {:.0}) after {} attempts",
                pick.position.x,
                pick.position.z,
                pick.attempts
            );
        } else {
            log::warn!(
                "committed blocked target ({:.0}, {:.0}) after {} attempts",
                pick.position.x,
                pick.position.z,
                pick.attempts
            );
        }
        pick
    }

    fn dispatch(&mut self, ctx: &mut ThinkContext<'_>, changed: bool, report: &mut ThinkReport) {
        if !changed && !self.redispatch {
            return;
        }
        self.redispatch = false;
        if let Some(clip) = self.species.clip_for(self.fsm.phase()) {
            ctx.animator.play(clip);
            report.clip = Some(clip.to_owned());
        }
    }

    // ========================================================================
    // Host API
    // ========================================================================

    /// Chase a point; the phase is re-checked on the next tick
    pub fn pursue(&mut self, point: Vec2) {
        self.target = point;
        self.target_age = 0.0;
        self.pursuit = PursuitState::ForceReassess;
    }

    /// Go back to wandering
    pub fn stop_pursuit(&mut self) {
        self.pursuit = PursuitState::Idle;
    }

    /// Boost turning for `duration_ms`; the host counts it down
    pub fn set_fear(&mut self, duration_ms: f32) {
        self.motion.fear_timer = duration_ms.max(0.0);
    }

    /// Start a jump unless the current phase is held
    pub fn start_jump(&mut self) -> Transition {
        if self.fsm.phase().is_held() {
            return Transition::None;
        }
        self.force(Phase::Jump)
    }

    /// Stop and eat until `finish_eating`
    pub fn start_eating(&mut self) -> Transition {
        self.force(Phase::Eat)
    }

    /// Leave the Eat phase
    pub fn finish_eating(&mut self) -> Transition {
        if !self.fsm.is_in(Phase::Eat) {
            return Transition::None;
        }
        self.force(Phase::Walk)
    }

    /// Set a phase owned by the host, such as Die or Sleep
    pub fn set_phase(&mut self, phase: Phase) -> Transition {
        self.force(phase)
    }

    fn force(&mut self, phase: Phase) -> Transition {
        let transition = self.fsm.force(phase);
        if transition != Transition::None {
            log::debug!("phase forced to {phase}");
            self.redispatch = true;
        }
        transition
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.fsm.phase()
    }

    #[must_use]
    pub fn pursuit(&self) -> PursuitState {
        self.pursuit
    }

    #[must_use]
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Milliseconds since the destination was picked
    #[must_use]
    pub fn target_age(&self) -> f32 {
        self.target_age
    }

    #[must_use]
    pub fn desired_heading(&self) -> f32 {
        self.desired_heading
    }

    #[must_use]
    pub fn on_water(&self) -> bool {
        self.on_water
    }

    #[must_use]
    pub fn aim_cooldown(&self) -> u32 {
        self.aim_cooldown
    }

    #[must_use]
    pub fn blocked_path_count(&self) -> u32 {
        self.blocked_path_count
    }

    #[must_use]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Mutable motion state, for hosts that own the fear countdown
    pub fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    #[must_use]
    pub fn species(&self) -> &SharedSpecies {
        &self.species
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::species::SpeciesProfile;
    use crate::ai::target::{MAP_MAX, MAP_MIN};
    use crate::world::{HeightField, ObstacleGrid};
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    /// Animator with a scripted finished flag that records requested clips
    #[derive(Default)]
    struct ScriptedAnimator {
        finished: bool,
        played: Vec<String>,
    }

    impl Animator for ScriptedAnimator {
        fn animation_finished(&self) -> bool {
            self.finished
        }

        fn play(&mut self, clip: &str) {
            self.played.push(clip.to_owned());
        }
    }

    struct Fixture {
        pose: Pose,
        terrain: HeightField,
        obstacles: ObstacleGrid,
        rng: Xoshiro256StarStar,
        animator: ScriptedAnimator,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                pose: Pose::new(Vec3::new(10_000.0, 0.0, 10_000.0), 0.0),
                terrain: HeightField::flat(80, 80, 256.0, 0.0),
                obstacles: ObstacleGrid::new(80, 80, 256.0),
                rng: Xoshiro256StarStar::seed_from_u64(7),
                animator: ScriptedAnimator::default(),
            }
        }

        fn think(&mut self, brain: &mut CreatureBrain, dt: f32) -> ThinkReport {
            let mut ctx = ThinkContext {
                pose: &mut self.pose,
                terrain: &self.terrain,
                obstacles: &self.obstacles,
                rng: &mut self.rng,
                animator: &mut self.animator,
            };
            brain.think(&mut ctx, dt)
        }
    }

    fn brain(fixture: &Fixture) -> CreatureBrain {
        CreatureBrain::new(Arc::new(SpeciesProfile::default()), &fixture.pose)
    }

    #[test]
    fn test_arrived_wanderer_picks_wide_target() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.target = fixture.pose.xz() + Vec2::new(300.0, 0.0);

        let report = fixture.think(&mut brain, 16.0);

        assert_eq!(report.retargets.len(), 1);
        let pick = report.retargets[0];
        assert!(pick.range >= WANDER_RANGE + 512.0);
        for axis in [pick.position.x, pick.position.z] {
            assert!((MAP_MIN..=MAP_MAX).contains(&axis));
        }
        assert_eq!(brain.target(), pick.xz());
        assert_eq!(brain.target_age(), 0.0);
    }

    #[test]
    fn test_old_target_is_replaced() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursue(fixture.pose.xz() + Vec2::new(0.0, 5000.0));
        brain.target_age = RETARGET_AGE_MS;

        let report = fixture.think(&mut brain, 16.0);

        assert_eq!(report.retargets.len(), 1);
        assert_eq!(brain.target_age(), 0.0);
    }

    #[test]
    fn test_old_target_and_arrival_both_reported() {
        /// Random source that always draws zero
        struct Still;

        impl RandomSource for Still {
            fn uniform_int(&mut self, _range: u32) -> u32 {
                0
            }

            fn uniform_signed_int(&mut self, _range: i32) -> i32 {
                0
            }
        }

        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.target_age = RETARGET_AGE_MS;

        // Every draw lands on the origin, so the aged pick is also an arrival
        let mut ctx = ThinkContext {
            pose: &mut fixture.pose,
            terrain: &fixture.terrain,
            obstacles: &fixture.obstacles,
            rng: &mut Still,
            animator: &mut fixture.animator,
        };
        let report = brain.think(&mut ctx, 16.0);

        assert_eq!(report.retargets.len(), 2);
        assert_eq!(report.retargets[0].range, RETARGET_RANGE + 512.0);
        assert_eq!(report.retargets[1].range, WANDER_RANGE + 512.0);
        assert_eq!(brain.target(), report.retargets[1].xz());
    }

    #[test]
    fn test_pursuer_on_water_swims() {
        let mut fixture = Fixture::new();
        fixture.terrain.flood_below(500.0);
        let mut brain = brain(&fixture);
        brain.pursuit = PursuitState::Pursuing;
        brain.target = fixture.pose.xz() + Vec2::new(0.0, 4000.0);

        let report = fixture.think(&mut brain, 16.0);

        assert!(brain.on_water());
        assert_eq!(brain.phase(), Phase::Swim);
        assert_eq!(
            report.transition,
            Some(PhaseChange {
                from: Phase::Walk,
                to: Phase::Swim
            })
        );
        assert_eq!(fixture.animator.played.last().map(String::as_str), Some("idle"));
        assert!((fixture.pose.position.y - 300.0).abs() < 1e-3);
        assert!(brain.motion().swimming);
    }

    #[test]
    fn test_jump_lands_in_run_when_animation_finishes() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursue(fixture.pose.xz() + Vec2::new(0.0, 4000.0));
        assert_eq!(brain.start_jump(), Transition::To(Phase::Jump));

        fixture.think(&mut brain, 16.0);
        assert_eq!(brain.phase(), Phase::Jump);
        assert_eq!(brain.pursuit(), PursuitState::ForceReassess);

        fixture.animator.finished = true;
        let report = fixture.think(&mut brain, 16.0);

        assert_eq!(brain.phase(), Phase::Run);
        assert_eq!(brain.pursuit(), PursuitState::Pursuing);
        assert_eq!(report.clip.as_deref(), Some("run"));
    }

    #[test]
    fn test_forced_jump_ignores_previous_clip_finish() {
        let mut fixture = Fixture::new();
        let mut profile = SpeciesProfile::default();
        profile.clips.jump = Some("jump".into());
        let mut brain = CreatureBrain::new(Arc::new(profile), &fixture.pose);
        brain.pursue(fixture.pose.xz() + Vec2::new(0.0, 4000.0));
        fixture.think(&mut brain, 16.0);

        // The walk clip wraps on the same tick the jump is requested
        fixture.animator.finished = true;
        assert_eq!(brain.start_jump(), Transition::To(Phase::Jump));
        let report = fixture.think(&mut brain, 16.0);

        assert_eq!(brain.phase(), Phase::Jump);
        assert_eq!(report.transition, None);
        assert_eq!(fixture.animator.played.last().map(String::as_str), Some("jump"));

        // The next finish belongs to the jump clip
        let report = fixture.think(&mut brain, 16.0);
        assert_eq!(brain.phase(), Phase::Run);
        assert_eq!(report.clip.as_deref(), Some("run"));
    }

    #[test]
    fn test_long_blockage_suppresses_aiming() {
        let mut fixture = Fixture::new();
        fixture.obstacles.block_where(|_| true);
        let mut brain = brain(&fixture);
        brain.pursuit = PursuitState::Pursuing;
        brain.target = fixture.pose.xz() + Vec2::new(0.0, 4000.0);
        brain.blocked_path_count = BLOCKED_PATH_LIMIT;

        let report = fixture.think(&mut brain, 16.0);

        assert_eq!(brain.blocked_path_count(), 0);
        let cooldown = brain.aim_cooldown();
        assert!((AIM_COOLDOWN_BASE..AIM_COOLDOWN_BASE + AIM_COOLDOWN_SPREAD).contains(&cooldown));
        assert_eq!(report.aim_suppressed, Some(cooldown));
    }

    #[test]
    fn test_cooldown_keeps_previous_aim() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursuit = PursuitState::Pursuing;
        brain.target = fixture.pose.xz() + Vec2::new(4000.0, 0.0);
        brain.desired_heading = 0.3;
        brain.aim_cooldown = 5;

        fixture.think(&mut brain, 16.0);

        assert_eq!(brain.aim_cooldown(), 4);
        assert!((brain.desired_heading() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_aim_blends_toward_target() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursuit = PursuitState::Pursuing;
        // Due +X is heading π/2; the blend with heading 0 lands at π/4
        brain.target = fixture.pose.xz() + Vec2::new(4000.0, 0.0);

        fixture.think(&mut brain, 16.0);

        assert!((brain.desired_heading() - std::f32::consts::FRAC_PI_4).abs() < 1e-4);
    }

    #[test]
    fn test_eating_skips_steering() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursue(fixture.pose.xz() + Vec2::new(4000.0, 0.0));
        brain.start_eating();

        let report = fixture.think(&mut brain, 100.0);

        assert_eq!(brain.phase(), Phase::Eat);
        assert_eq!(fixture.pose.heading, 0.0);
        assert_eq!(fixture.pose.xz(), Vec2::new(10_000.0, 10_000.0));
        assert_eq!(report.clip.as_deref(), Some("idle"));

        assert_eq!(brain.finish_eating(), Transition::To(Phase::Walk));
        assert_eq!(brain.finish_eating(), Transition::None);
    }

    #[test]
    fn test_held_phase_blocks_jump() {
        let fixture = Fixture::new();
        let mut brain = brain(&fixture);

        assert_eq!(brain.set_phase(Phase::Sleep), Transition::To(Phase::Sleep));
        assert_eq!(brain.start_jump(), Transition::None);
        assert_eq!(brain.phase(), Phase::Sleep);
    }

    #[test]
    fn test_zero_dt_keeps_position() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        brain.pursue(fixture.pose.xz() + Vec2::new(0.0, 4000.0));
        brain.motion_mut().forward_speed = 0.5;

        fixture.think(&mut brain, 0.0);

        assert_eq!(fixture.pose.xz(), Vec2::new(10_000.0, 10_000.0));
        assert_eq!(brain.motion().forward_speed, 0.5);
    }

    #[test]
    fn test_pursuit_moves_toward_target() {
        let mut fixture = Fixture::new();
        let mut brain = brain(&fixture);
        let target = fixture.pose.xz() + Vec2::new(0.0, 6000.0);
        brain.pursue(target);
        let start = fixture.pose.xz().distance(target);

        for _ in 0..200 {
            fixture.think(&mut brain, 16.0);
        }

        assert_eq!(brain.phase(), Phase::Run);
        assert!(fixture.pose.xz().distance(target) < start - 1000.0);
    }
}
