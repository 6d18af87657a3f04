use glam::Mat4;
use scenekit_common::Aabb;

use crate::mesh::{AnimatedMesh, AnimationPose, ClipSelection};
use crate::table::AssetError;

/// In-memory stand-in for an imported mesh: bounds, clip names and an
/// optional bind-pose skeleton, with no vertex data.
///
/// It records the last pose it was sampled into, which is what headless runs
/// and tests observe. Clips out of range fall back to the bind pose.
#[derive(Debug, Clone)]
pub struct PlaceholderMesh {
    name: String,
    bounds: Aabb,
    clips: Vec<String>,
    bones: Vec<Mat4>,
    inverse_binds: Vec<Mat4>,
    pose: AnimationPose,
    samples: u64,
}

impl PlaceholderMesh {
    pub fn new(name: impl Into<String>, bounds: Aabb) -> Self {
        Self {
            name: name.into(),
            bounds,
            clips: Vec::new(),
            bones: Vec::new(),
            inverse_binds: Vec::new(),
            pose: AnimationPose::BindPose,
            samples: 0,
        }
    }

    pub fn with_clips<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clips = names.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a skeleton. Both slices describe the same bones in order.
    pub fn with_skeleton(
        mut self,
        bones: Vec<Mat4>,
        inverse_binds: Vec<Mat4>,
    ) -> Result<Self, AssetError> {
        if bones.len() != inverse_binds.len() {
            return Err(AssetError::BoneCountMismatch {
                mesh: self.name,
                bones: bones.len(),
                inverse_binds: inverse_binds.len(),
            });
        }
        self.bones = bones;
        self.inverse_binds = inverse_binds;
        Ok(self)
    }

    /// Skeleton whose bones sit at `joints` (model space) in bind pose.
    pub fn with_bind_pose_joints(self, joints: &[Mat4]) -> Result<Self, AssetError> {
        let bones = vec![Mat4::IDENTITY; joints.len()];
        let inverse_binds = joints.iter().map(Mat4::inverse).collect();
        self.with_skeleton(bones, inverse_binds)
    }

    /// How many times a pose has been sampled.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    fn has_clip(&self, clip: usize) -> bool {
        clip < self.clips.len()
    }
}

impl AnimatedMesh for PlaceholderMesh {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_aabb(&self) -> Aabb {
        self.bounds
    }

    fn bone_matrices(&self) -> &[Mat4] {
        &self.bones
    }

    fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_binds
    }

    fn animation_count(&self) -> usize {
        self.clips.len()
    }

    fn animation_name(&self, clip: usize) -> Option<&str> {
        self.clips.get(clip).map(String::as_str)
    }

    fn animate(&mut self, clip: ClipSelection, time: f32) {
        self.samples += 1;
        self.pose = match clip {
            ClipSelection::Clip(clip) if self.has_clip(clip) => AnimationPose::Clip { clip, time },
            ClipSelection::Clip(clip) => {
                tracing::warn!(mesh = %self.name, clip, "clip out of range, using bind pose");
                AnimationPose::BindPose
            }
            ClipSelection::BindPose => AnimationPose::BindPose,
        };
    }

    fn animate_blend(&mut self, from: usize, to: usize, from_time: f32, to_time: f32, factor: f32) {
        self.samples += 1;
        if !self.has_clip(from) || !self.has_clip(to) {
            tracing::warn!(mesh = %self.name, from, to, "blend clip out of range, using bind pose");
            self.pose = AnimationPose::BindPose;
            return;
        }
        self.pose = AnimationPose::Blend {
            from,
            to,
            from_time,
            to_time,
            factor: factor.clamp(0.0, 1.0),
        };
    }

    fn pose(&self) -> AnimationPose {
        self.pose
    }
}
