use glam::Mat4;
use scenekit_common::Aabb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which clip drives a mesh: its bind pose or a clip by index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipSelection {
    #[default]
    BindPose,
    Clip(usize),
}

impl ClipSelection {
    /// Interpret the signed index convention where `-1` is the bind pose.
    pub fn from_signed(index: i32) -> Self {
        usize::try_from(index).map_or(Self::BindPose, Self::Clip)
    }

    /// Signed form of the selection. Indices past `i32::MAX` saturate.
    pub fn to_signed(self) -> i32 {
        match self {
            Self::BindPose => -1,
            Self::Clip(i) => i32::try_from(i).unwrap_or(i32::MAX),
        }
    }
}

impl fmt::Display for ClipSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindPose => f.write_str("bind pose"),
            Self::Clip(i) => write!(f, "clip {i}"),
        }
    }
}

/// The last pose a mesh was sampled into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum AnimationPose {
    #[default]
    BindPose,
    Clip { clip: usize, time: f32 },
    Blend {
        from: usize,
        to: usize,
        from_time: f32,
        to_time: f32,
        factor: f32,
    },
}

/// Interface to a loaded, possibly skinned and animated mesh.
///
/// Loading and GPU upload happen elsewhere; the frame core only samples
/// poses and reads bounds and skeleton matrices.
pub trait AnimatedMesh {
    fn name(&self) -> &str;

    /// Bind-pose bounds in model space.
    fn model_aabb(&self) -> Aabb;

    /// Current per-bone skinning matrices.
    fn bone_matrices(&self) -> &[Mat4];

    /// Per-bone inverse bind matrices, parallel to `bone_matrices`.
    fn inverse_bind_matrices(&self) -> &[Mat4];

    fn animation_count(&self) -> usize;

    fn animation_name(&self, clip: usize) -> Option<&str>;

    /// Sample a single clip at `time` seconds.
    fn animate(&mut self, clip: ClipSelection, time: f32);

    /// Sample two clips and mix them; `factor` 0 is all `from`, 1 all `to`.
    fn animate_blend(&mut self, from: usize, to: usize, from_time: f32, to_time: f32, factor: f32);

    fn pose(&self) -> AnimationPose;
}
