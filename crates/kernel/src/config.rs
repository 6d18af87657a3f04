//! Scene configuration. Every field has a default reproducing the reference
//! scene, so a config file only needs the values it changes.

use glam::Vec3;
use scenekit_assets::ClipSelection;
use scenekit_ecs::NpcBehavior;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub player: PlayerConfig,
    pub npc: NpcConfig,
    pub wanderer: WandererConfig,
    pub light: LightConfig,
    pub animation: AnimationConfig,
    pub show_bone_gizmos: bool,
}

impl SceneConfig {
    /// Parse a config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Pretty-printed JSON, suitable as a starting config file.
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Orbit camera rig.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,
    pub yaw: f32,
    pub pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 15.0,
            sensitivity: 0.005,
            near: 1.0,
            far: 500.0,
            yaw: 0.0,
            pitch: -std::f32::consts::PI / 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub spawn: Vec3,
    pub scale: f32,
    pub max_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(5.0, 0.0, 5.0),
            scale: 0.01,
            max_speed: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NpcConfig {
    pub spawn: Vec3,
    pub scale: f32,
    pub speed: f32,
    pub waypoints: Vec<Vec3>,
    pub behavior: NpcBehavior,
}

impl Default for NpcConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(10.0, 0.0, 10.0),
            scale: 0.01,
            speed: 2.0,
            waypoints: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 0.0),
                Vec3::new(10.0, 0.0, 10.0),
                Vec3::new(0.0, 0.0, 10.0),
            ],
            behavior: NpcBehavior::default(),
        }
    }
}

/// A prop entity that drifts at a constant velocity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WandererConfig {
    pub spawn: Vec3,
    pub scale: f32,
    pub velocity: Vec3,
}

impl Default for WandererConfig {
    fn default() -> Self {
        Self {
            spawn: Vec3::new(5.0, 0.0, 5.0),
            scale: 0.01,
            velocity: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: Vec3,
    /// Radians per second the light circles the scene.
    pub orbit_rate: f32,
    pub orbit_offset: Vec3,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Vec3::new(1.0, 1.0, 0.8),
            orbit_rate: 0.1,
            orbit_offset: Vec3::splat(100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub playback_speed: f32,
    pub use_blending: bool,
    pub use_debug_blend: bool,
    pub debug_blend_factor: f32,
    pub character_clip: ClipSelection,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            playback_speed: 1.0,
            use_blending: true,
            use_debug_blend: false,
            debug_blend_factor: 1.0,
            character_clip: ClipSelection::BindPose,
        }
    }
}
