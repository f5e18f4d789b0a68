//! Clip playback control
//!
//! A `ClipPlayer` advances the active clip each tick and reports when a cycle
//! completes, which is the signal the locomotion state machine waits on.

use super::Animator;
use super::clip::{ClipInfo, ClipLibrary};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Clip is playing
    Playing,
    /// Clip has stopped
    #[default]
    Stopped,
}

/// Per-creature clip player
#[derive(Debug, Clone, Default)]
pub struct ClipPlayer {
    /// Currently playing clip
    clip: Option<ClipInfo>,
    /// Playback time in milliseconds
    current_time: f32,
    /// Playback speed multiplier
    speed: f32,
    state: PlaybackState,
    /// A cycle completed during the last `advance`
    finished: bool,
    /// Clip requested by the controller and not yet resolved
    pending: Option<String>,
}

impl ClipPlayer {
    /// Create an idle player
    #[must_use]
    pub fn new() -> Self {
        Self {
            speed: 1.0,
            ..Default::default()
        }
    }

    /// Start a clip from the beginning
    pub fn set_clip(&mut self, clip: ClipInfo) {
        self.clip = Some(clip);
        self.current_time = 0.0;
        self.state = PlaybackState::Playing;
    }

    /// Resolve a requested clip against the library
    ///
    /// Returns the name of the clip that started. Unknown names stop playback.
    pub fn resolve(&mut self, library: &ClipLibrary) -> Option<String> {
        let name = self.pending.take()?;
        match library.get(&name) {
            Some(clip) => {
                self.set_clip(clip.clone());
                Some(name)
            }
            None => {
                log::warn!("unknown clip '{name}'");
                self.stop();
                None
            }
        }
    }

    /// Stop playback and reset to the beginning
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
    }

    /// Advance playback by `delta_ms`
    ///
    /// Sets the finished flag when a cycle completes during this call.
    pub fn advance(&mut self, delta_ms: f32) {
        self.finished = false;
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(clip) = &self.clip else {
            return;
        };

        // Empty clips complete immediately
        if clip.duration_ms <= 0.0 {
            self.current_time = 0.0;
            self.finished = true;
            if !clip.looping {
                self.state = PlaybackState::Stopped;
            }
            return;
        }

        self.current_time += delta_ms.max(0.0) * self.speed;

        if self.current_time >= clip.duration_ms {
            self.finished = true;
            if clip.looping {
                self.current_time %= clip.duration_ms;
            } else {
                self.current_time = clip.duration_ms;
                self.state = PlaybackState::Stopped;
            }
        }
    }

    /// Get current playback time
    #[must_use]
    pub const fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Get playback state
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Name of the current clip
    #[must_use]
    pub fn clip_name(&self) -> Option<&str> {
        self.clip.as_ref().map(|clip| clip.name.as_str())
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Get the normalized playback time (0.0 to 1.0)
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        if let Some(clip) = &self.clip
            && clip.duration_ms > 0.0
        {
            return self.current_time / clip.duration_ms;
        }
        0.0
    }
}

impl Animator for ClipPlayer {
    fn animation_finished(&self) -> bool {
        self.finished
    }

    fn play(&mut self, clip: &str) {
        self.pending = Some(clip.to_owned());
    }
}
