//! Creature AI module
//!
//! Destination picking, obstacle-aware heading search, the locomotion state
//! machine and the steering integrator, composed per tick by `CreatureBrain`.

pub mod angle;
mod brain;
mod fsm;
mod probe;
mod species;
mod steering;
mod target;

pub use brain::{CreatureBrain, PhaseChange, ThinkContext, ThinkReport};
pub use fsm::{LocomotionFsm, LocomotionInput, Phase, PursuitState, Transition};
pub use probe::{PathChoice, find_heading, probe};
pub use species::{
    ClipNames, PhaseSpeeds, SharedSpecies, SpeciesPolicy, SpeciesProfile, SpeciesRegistry,
    TurnProfile,
};
pub use steering::{Motion, SteeringOutcome, ramp_toward, settle_vertical};
pub use target::{MAP_MAX, MAP_MIN, TargetPick, select_target};
