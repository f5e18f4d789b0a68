//! Herd scene files
//!
//! A scene lists the species in play and where each creature starts. Scenes
//! are saved and loaded as RON or JSON.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ai::{SpeciesProfile, SpeciesRegistry};

/// One creature to spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureSpawn {
    /// Creature name used in logs
    pub name: String,
    /// Species name, looked up in the scene's species table
    pub species: String,
    /// Spawn position (Y is snapped to the terrain on spawn)
    pub position: Vec3,
    /// Initial heading in radians
    #[serde(default)]
    pub heading: f32,
    /// Size multiplier
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

impl CreatureSpawn {
    /// Create a spawn facing +Z at unit scale
    #[must_use]
    pub fn new(name: impl Into<String>, species: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            species: species.into(),
            position,
            heading: 0.0,
            scale: 1.0,
        }
    }

    #[must_use]
    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// A serializable herd: species table plus spawn list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HerdScene {
    /// Scene name
    pub name: String,
    /// Scene version for compatibility
    pub version: u32,
    /// Species available to spawns
    #[serde(default)]
    pub species: Vec<SpeciesProfile>,
    /// Creatures to spawn
    #[serde(default)]
    pub spawns: Vec<CreatureSpawn>,
}

impl HerdScene {
    /// Create a new empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            species: Vec::new(),
            spawns: Vec::new(),
        }
    }

    /// Add a species to the table
    pub fn add_species(&mut self, profile: SpeciesProfile) {
        self.species.push(profile);
    }

    /// Add a creature to spawn and return its index
    pub fn add_spawn(&mut self, spawn: CreatureSpawn) -> usize {
        let index = self.spawns.len();
        self.spawns.push(spawn);
        index
    }

    /// Build a species registry from the table
    #[must_use]
    pub fn registry(&self) -> SpeciesRegistry {
        self.species.iter().cloned().collect()
    }

    /// Check that every spawn names a known species
    ///
    /// # Errors
    ///
    /// Returns `UnknownSpecies` for the first spawn with no matching species
    pub fn validate(&self) -> Result<(), SceneError> {
        let registry = self.registry();
        match self
            .spawns
            .iter()
            .find(|spawn| registry.get(&spawn.species).is_none())
        {
            Some(spawn) => Err(SceneError::UnknownSpecies(spawn.species.clone())),
            None => Ok(()),
        }
    }

    /// Save the scene to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: HerdScene =
            ron::from_str(&content).map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Save the scene to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| SceneError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| SceneError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a scene from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let content = fs::read_to_string(path).map_err(|e| SceneError::IoError(e.to_string()))?;
        let scene: HerdScene = serde_json::from_str(&content)
            .map_err(|e| SceneError::DeserializeError(e.to_string()))?;
        Ok(scene)
    }

    /// Get the number of spawns
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    /// Check if the scene spawns nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
    }
}

impl Default for HerdScene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur during scene operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A spawn names a species missing from the table
    UnknownSpecies(String),
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::UnknownSpecies(name) => write!(f, "Unknown species: {name}"),
        }
    }
}

impl std::error::Error for SceneError {}
