//! Headless herd simulation and its tick loop

use glam::{Vec2, Vec3};
use hecs::{Entity, World};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use super::events::{CreatureEvent, EventQueue};
use super::scene::{HerdScene, SceneError};
use crate::ai::{CreatureBrain, Phase, SharedSpecies, ThinkContext, ThinkReport, Transition};
use crate::animation::{ClipLibrary, ClipPlayer};
use crate::ecs::{Name, Pose};
use crate::world::{ObstacleMap, Terrain};

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the shared random source
    pub seed: u64,
    /// Tick length in milliseconds
    pub tick_ms: f32,
    /// Number of ticks `run` performs
    pub ticks: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            tick_ms: 16.0,
            ticks: 600,
        }
    }
}

impl SimulationConfig {
    /// Set the random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tick length
    #[must_use]
    pub fn with_tick_ms(mut self, tick_ms: f32) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Set the tick count
    #[must_use]
    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = ticks;
        self
    }
}

/// A herd of creatures on one terrain
pub struct Simulation {
    world: World,
    terrain: Box<dyn Terrain>,
    obstacles: Box<dyn ObstacleMap>,
    clips: ClipLibrary,
    rng: Xoshiro256StarStar,
    events: EventQueue,
    tick: u64,
}

impl Simulation {
    /// Create an empty simulation
    pub fn new(
        config: &SimulationConfig,
        terrain: impl Terrain + 'static,
        obstacles: impl ObstacleMap + 'static,
    ) -> Self {
        Self {
            world: World::new(),
            terrain: Box::new(terrain),
            obstacles: Box::new(obstacles),
            clips: ClipLibrary::standard(),
            rng: Xoshiro256StarStar::seed_from_u64(config.seed),
            events: EventQueue::new(),
            tick: 0,
        }
    }

    /// Create a simulation and spawn every creature a scene lists
    ///
    /// # Errors
    ///
    /// Returns `UnknownSpecies` if a spawn names a species the scene lacks
    pub fn from_scene(
        config: &SimulationConfig,
        scene: &HerdScene,
        terrain: impl Terrain + 'static,
        obstacles: impl ObstacleMap + 'static,
    ) -> Result<Self, SceneError> {
        let registry = scene.registry();
        let mut sim = Self::new(config, terrain, obstacles);

        for spawn in &scene.spawns {
            let species = registry
                .get(&spawn.species)
                .ok_or_else(|| SceneError::UnknownSpecies(spawn.species.clone()))?;
            let pose = Pose::new(spawn.position, spawn.heading).with_scale(spawn.scale);
            sim.spawn(&spawn.name, species, pose);
        }

        log::info!(
            "Loaded scene '{}' with {} creatures",
            scene.name,
            sim.creature_count()
        );
        Ok(sim)
    }

    /// Replace the clip library used to resolve clip requests
    #[must_use]
    pub fn with_clips(mut self, clips: ClipLibrary) -> Self {
        self.clips = clips;
        self
    }

    /// Spawn a creature, snapping it onto the terrain
    pub fn spawn(&mut self, name: &str, species: SharedSpecies, mut pose: Pose) -> Entity {
        pose.position.y = self.terrain.height(pose.position.x, pose.position.z);
        let brain = CreatureBrain::new(species, &pose);
        log::info!(
            "Spawned {name} ({}) at ({:.0}, {:.0})",
            brain.species().profile().name,
            pose.position.x,
            pose.position.z
        );
        self.world.spawn((Name::new(name), pose, brain, ClipPlayer::new()))
    }

    /// Advance every creature by `dt` milliseconds
    pub fn step(&mut self, dt: f32) {
        self.events.swap();

        for (entity, (pose, brain, player)) in self
            .world
            .query_mut::<(&mut Pose, &mut CreatureBrain, &mut ClipPlayer)>()
        {
            player.advance(dt);

            let mut ctx = ThinkContext {
                pose,
                terrain: self.terrain.as_ref(),
                obstacles: self.obstacles.as_ref(),
                rng: &mut self.rng,
                animator: &mut *player,
            };
            let report = brain.think(&mut ctx, dt);

            let fear = &mut brain.motion_mut().fear_timer;
            *fear = (*fear - dt.max(0.0)).max(0.0);

            if let Some(clip) = player.resolve(&self.clips) {
                self.events.push(CreatureEvent::ClipStarted { entity, clip });
            }
            record(&mut self.events, entity, report);
        }

        self.tick += 1;
    }

    /// Run the configured number of ticks
    pub fn run(&mut self, config: &SimulationConfig) {
        log::info!(
            "Running {} ticks of {} ms ({} creatures)",
            config.ticks,
            config.tick_ms,
            self.creature_count()
        );
        for _ in 0..config.ticks {
            self.step(config.tick_ms);
        }
        log::info!("Simulation finished at tick {}", self.tick);
    }

    // ========================================================================
    // Per-creature commands
    // ========================================================================

    /// Tell a creature to chase a point
    pub fn pursue(&mut self, entity: Entity, point: Vec2) -> bool {
        self.with_brain(entity, |brain| brain.pursue(point)).is_some()
    }

    /// Send a creature back to wandering
    pub fn stop_pursuit(&mut self, entity: Entity) -> bool {
        self.with_brain(entity, CreatureBrain::stop_pursuit).is_some()
    }

    /// Scare a creature for `duration_ms`; `step` counts the timer down
    pub fn set_fear(&mut self, entity: Entity, duration_ms: f32) -> bool {
        self.with_brain(entity, |brain| brain.set_fear(duration_ms)).is_some()
    }

    /// Make a creature jump; `None` for an unknown entity
    pub fn start_jump(&mut self, entity: Entity) -> Option<Transition> {
        self.with_brain(entity, CreatureBrain::start_jump)
    }

    pub fn start_eating(&mut self, entity: Entity) -> Option<Transition> {
        self.with_brain(entity, CreatureBrain::start_eating)
    }

    pub fn finish_eating(&mut self, entity: Entity) -> Option<Transition> {
        self.with_brain(entity, CreatureBrain::finish_eating)
    }

    /// Put a creature in a host-owned phase such as Die or Sleep
    pub fn set_phase(&mut self, entity: Entity, phase: Phase) -> Option<Transition> {
        self.with_brain(entity, |brain| brain.set_phase(phase))
    }

    fn with_brain<R>(
        &mut self,
        entity: Entity,
        command: impl FnOnce(&mut CreatureBrain) -> R,
    ) -> Option<R> {
        let mut brain = self.world.get::<&mut CreatureBrain>(entity).ok()?;
        Some(command(&mut *brain))
    }

    /// Events from the previous tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Every creature entity
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        let mut query = self.world.query::<&CreatureBrain>();
        query.iter().map(|(entity, _)| entity).collect()
    }

    /// Ticks performed so far
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of creatures
    #[must_use]
    pub fn creature_count(&self) -> usize {
        self.world.len() as usize
    }

    /// Current pose of a creature
    #[must_use]
    pub fn pose_of(&self, entity: Entity) -> Option<Pose> {
        self.world.get::<&Pose>(entity).ok().map(|pose| *pose)
    }

    /// Current phase of a creature
    #[must_use]
    pub fn phase_of(&self, entity: Entity) -> Option<Phase> {
        self.world
            .get::<&CreatureBrain>(entity)
            .ok()
            .map(|brain| brain.phase())
    }

    /// Name, pose and phase of every creature
    #[must_use]
    pub fn summaries(&self) -> Vec<(String, Vec3, Phase)> {
        let mut query = self.world.query::<(&Name, &Pose, &CreatureBrain)>();
        query
            .iter()
            .map(|(_, (name, pose, brain))| (name.0.clone(), pose.position, brain.phase()))
            .collect()
    }
}

fn record(events: &mut EventQueue, entity: Entity, report: ThinkReport) {
    if let Some(change) = report.transition {
        events.push(CreatureEvent::PhaseChanged {
            entity,
            from: change.from,
            to: change.to,
        });
    }
    for pick in report.retargets {
        events.push(CreatureEvent::TargetChosen {
            entity,
            target: pick.position,
            clear: pick.placement_clear,
        });
    }
    if let Some(duration_ms) = report.slide_started {
        events.push(CreatureEvent::SlideStarted {
            entity,
            duration_ms,
        });
    }
    if let Some(cooldown) = report.aim_suppressed {
        events.push(CreatureEvent::AimSuppressed { entity, cooldown });
    }
}
