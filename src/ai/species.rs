//! Per-species behavior policy
//!
//! A species decides which clip plays for each phase and supplies the speed
//! and turning constants the steering integrator uses. The data-driven
//! `SpeciesProfile` covers most creatures; hand-written policies can wrap a
//! profile and override individual clip hooks.

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::fsm::Phase;

/// Base forward speed per phase, in world units per ms before scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseSpeeds {
    pub run: f32,
    pub walk: f32,
    pub swim: f32,
    pub jump: f32,
    pub eat: f32,
}

impl Default for PhaseSpeeds {
    fn default() -> Self {
        Self {
            run: 1.2,
            walk: 0.428,
            swim: 0.4,
            jump: 1.1,
            eat: 0.0,
        }
    }
}

impl PhaseSpeeds {
    /// Base speed for a phase (zero for Slide, Die and Sleep)
    #[must_use]
    pub fn for_phase(&self, phase: Phase) -> f32 {
        match phase {
            Phase::Run => self.run,
            Phase::Walk => self.walk,
            Phase::Swim => self.swim,
            Phase::Jump => self.jump,
            Phase::Eat => self.eat,
            Phase::Slide | Phase::Die | Phase::Sleep => 0.0,
        }
    }
}

/// Turning and lean constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnProfile {
    /// Minimum target turn rate outside the dead zone
    pub base_rate: f32,
    /// Extra turn rate per radian of heading error
    pub rate_gain: f32,
    /// Heading error (radians) below which no turn is requested
    pub dead_zone: f32,
    /// Turn rate multiplier while afraid
    pub fear_multiplier: f32,
    /// Turn rate divisor for walking and swimming
    pub slow_gait_divisor: f32,
    /// Turn rate ramp damping (ms per unit of rate)
    pub damping: f32,
    /// Turn rate ramp damping while afraid
    pub fear_damping: f32,
    /// Largest lean magnitude (radians)
    pub max_lean: f32,
    /// Lean ramp damping while the lean grows
    pub lean_grow_damping: f32,
    /// Lean ramp damping while the lean settles
    pub lean_settle_damping: f32,
}

impl Default for TurnProfile {
    fn default() -> Self {
        Self {
            base_rate: 0.6,
            rate_gain: 1.2,
            dead_zone: 0.02,
            fear_multiplier: 2.5,
            slow_gait_divisor: 1.4,
            damping: 180.0,
            fear_damping: 160.0,
            max_lean: PI / 5.0,
            lean_grow_damping: 800.0,
            lean_settle_damping: 600.0,
        }
    }
}

/// Clip names played when entering each phase
///
/// `None` makes the dispatch a no-op. Swim, slide, jump and eat fall back to
/// the idle clip when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipNames {
    pub run: Option<String>,
    pub walk: Option<String>,
    pub idle: Option<String>,
    pub swim: Option<String>,
    pub slide: Option<String>,
    pub jump: Option<String>,
    pub eat: Option<String>,
}

impl Default for ClipNames {
    fn default() -> Self {
        Self {
            run: Some("run".into()),
            walk: Some("walk".into()),
            idle: Some("idle".into()),
            swim: None,
            slide: None,
            jump: None,
            eat: None,
        }
    }
}

/// Data-driven species description, loadable from RON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciesProfile {
    /// Species name used by scenes and logs
    pub name: String,
    pub speeds: PhaseSpeeds,
    pub turn: TurnProfile,
    /// Forward speed ramp damping
    pub speed_damping: f32,
    /// Treat deep water as an obstacle when moving and probing
    pub blocked_by_water: bool,
    /// Treat static models as obstacles when moving and probing
    pub blocked_by_models: bool,
    pub clips: ClipNames,
}

impl Default for SpeciesProfile {
    fn default() -> Self {
        Self {
            name: String::from("generic"),
            speeds: PhaseSpeeds::default(),
            turn: TurnProfile::default(),
            speed_damping: 500.0,
            blocked_by_water: false,
            blocked_by_models: true,
            clips: ClipNames::default(),
        }
    }
}

impl SpeciesProfile {
    /// Create a profile with default constants
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Use species-prefixed walk and run clips and no idle clip
    #[must_use]
    pub fn with_own_gaits(mut self) -> Self {
        self.clips = ClipNames {
            run: Some(format!("{}_run", self.name)),
            walk: Some(format!("{}_walk", self.name)),
            idle: None,
            ..ClipNames::default()
        };
        self
    }

    /// Override the per-phase speeds
    #[must_use]
    pub fn with_speeds(mut self, speeds: PhaseSpeeds) -> Self {
        self.speeds = speeds;
        self
    }
}

/// Strategy deciding per-species clips and constants
pub trait SpeciesPolicy: fmt::Debug + Send + Sync {
    /// Constants for steering and dispatch
    fn profile(&self) -> &SpeciesProfile;

    /// Clip to play when entering `phase`, or `None` for no-op
    fn clip_for(&self, phase: Phase) -> Option<&str> {
        match phase {
            Phase::Run => self.run_clip(),
            Phase::Walk => self.walk_clip(),
            Phase::Swim => self.swim_clip(),
            Phase::Slide => self.slide_clip(),
            Phase::Jump => self.jump_clip(),
            Phase::Eat => self.eat_clip(),
            Phase::Die | Phase::Sleep => self.idle_clip(),
        }
    }

    fn run_clip(&self) -> Option<&str> {
        self.profile().clips.run.as_deref()
    }

    fn walk_clip(&self) -> Option<&str> {
        self.profile().clips.walk.as_deref()
    }

    fn idle_clip(&self) -> Option<&str> {
        self.profile().clips.idle.as_deref()
    }

    fn swim_clip(&self) -> Option<&str> {
        self.profile().clips.swim.as_deref().or_else(|| self.idle_clip())
    }

    fn slide_clip(&self) -> Option<&str> {
        self.profile().clips.slide.as_deref().or_else(|| self.idle_clip())
    }

    fn jump_clip(&self) -> Option<&str> {
        self.profile().clips.jump.as_deref().or_else(|| self.idle_clip())
    }

    fn eat_clip(&self) -> Option<&str> {
        self.profile().clips.eat.as_deref().or_else(|| self.idle_clip())
    }
}

impl SpeciesPolicy for SpeciesProfile {
    fn profile(&self) -> &SpeciesProfile {
        self
    }
}

/// Shared handle to a species policy
pub type SharedSpecies = Arc<dyn SpeciesPolicy>;

/// Species lookup by name
#[derive(Debug, Default, Clone)]
pub struct SpeciesRegistry {
    species: FxHashMap<String, SharedSpecies>,
}

impl SpeciesRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data-driven profile under its own name
    pub fn insert_profile(&mut self, profile: SpeciesProfile) {
        let name = profile.name.clone();
        self.insert(name, Arc::new(profile));
    }

    /// Register any policy under a name, replacing an existing entry
    pub fn insert(&mut self, name: impl Into<String>, policy: SharedSpecies) {
        self.species.insert(name.into(), policy);
    }

    /// Look up a species
    #[must_use]
    pub fn get(&self, name: &str) -> Option<SharedSpecies> {
        self.species.get(name).cloned()
    }

    /// Number of registered species
    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

impl FromIterator<SpeciesProfile> for SpeciesRegistry {
    fn from_iter<I: IntoIterator<Item = SpeciesProfile>>(iter: I) -> Self {
        let mut registry = Self::new();
        for profile in iter {
            registry.insert_profile(profile);
        }
        registry
    }
}
