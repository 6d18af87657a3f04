use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::trs_y;

/// Generational handle for an entity in the store.
///
/// The index addresses a slot; the generation distinguishes successive
/// occupants of that slot, so a handle kept past `destroy` never aliases a
/// newer entity. Ordering is by index first, which gives component tables a
/// canonical iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// A handle referencing a shared mesh asset in the mesh table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Spatial transform: position, euler rotation (radians), scale.
///
/// Only the yaw (Y) component of `rotation` reaches the world matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale.max(0.0));
        self
    }

    /// Translation, yaw-only rotation, then scale.
    pub fn world_matrix(&self) -> Mat4 {
        trs_y(self.position, self.rotation.y, self.scale)
    }
}
