//! Clip metadata
//!
//! The controller only needs to know how long a clip runs and whether it
//! loops; keyframe data stays with the renderer.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Timing description of one animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    /// Clip name
    pub name: String,
    /// Duration of one cycle in milliseconds
    pub duration_ms: f32,
    /// Whether the clip restarts after each cycle
    #[serde(default = "default_looping")]
    pub looping: bool,
}

fn default_looping() -> bool {
    true
}

impl ClipInfo {
    /// Create a looping clip
    #[must_use]
    pub fn new(name: impl Into<String>, duration_ms: f32) -> Self {
        Self {
            name: name.into(),
            duration_ms: duration_ms.max(0.0),
            looping: true,
        }
    }

    /// Play the clip once and hold the last frame
    #[must_use]
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }
}

/// Clips known to the simulation, by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipLibrary {
    clips: FxHashMap<String, ClipInfo>,
}

impl ClipLibrary {
    /// Create an empty library
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clip, replacing one with the same name
    pub fn insert(&mut self, clip: ClipInfo) {
        self.clips.insert(clip.name.clone(), clip);
    }

    /// Add a clip (builder form)
    #[must_use]
    pub fn with_clip(mut self, clip: ClipInfo) -> Self {
        self.insert(clip);
        self
    }

    /// Look up a clip
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ClipInfo> {
        self.clips.get(name)
    }

    /// Number of clips
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Check if the library is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Typical wildlife set: looping gaits and idle, one-shot jump
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_clip(ClipInfo::new("run", 600.0))
            .with_clip(ClipInfo::new("walk", 1200.0))
            .with_clip(ClipInfo::new("idle", 2000.0))
            .with_clip(ClipInfo::new("jump", 800.0).once())
    }
}
