//! Animation module
//!
//! Clip timing and playback. The controller talks to playback only through
//! the `Animator` trait.

mod clip;
mod player;

pub use clip::{ClipInfo, ClipLibrary};
pub use player::{ClipPlayer, PlaybackState};

/// Animation service seen by the locomotion controller
pub trait Animator {
    /// A clip cycle completed this tick
    fn animation_finished(&self) -> bool;

    /// Request a clip by name
    fn play(&mut self, clip: &str);
}
