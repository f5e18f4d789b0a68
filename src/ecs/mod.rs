//! Entity Component System module
//!
//! Creatures live in a hecs world as `Name`, `Pose`, `CreatureBrain` and
//! `ClipPlayer` components.

mod components;

pub use components::{Name, Pose};
