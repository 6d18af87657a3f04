use glam::{Mat4, Vec3};
use scenekit_assets::{AnimatedMesh, AnimationPose, MeshHandle};
use std::fmt;

/// Per-pass uniforms: camera matrices, light and eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub eye: Vec3,
}

/// Mesh renderer interface. One pass per frame: `begin_pass`, any number of
/// `submit`s, then `end_pass`.
///
/// The renderer only reads the mesh; posing happens before submission.
pub trait MeshRenderer {
    fn begin_pass(&mut self, uniforms: &PassUniforms);

    fn submit(&mut self, handle: MeshHandle, mesh: &dyn AnimatedMesh, world: Mat4);

    /// Finish the pass and return how many draw calls it issued.
    fn end_pass(&mut self) -> usize;
}

/// One recorded `submit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub handle: MeshHandle,
    pub mesh_name: String,
    pub world: Mat4,
    /// Pose the mesh held when it was submitted.
    pub pose: AnimationPose,
}

/// Headless mesh renderer that records the last pass instead of drawing it.
#[derive(Debug, Default)]
pub struct RecordingMeshRenderer {
    uniforms: Option<PassUniforms>,
    submissions: Vec<Submission>,
    in_pass: bool,
    passes: u64,
}

impl RecordingMeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniforms of the most recent pass.
    pub fn uniforms(&self) -> Option<&PassUniforms> {
        self.uniforms.as_ref()
    }

    /// Submissions of the most recent pass, in order.
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }
}

impl MeshRenderer for RecordingMeshRenderer {
    fn begin_pass(&mut self, uniforms: &PassUniforms) {
        if self.in_pass {
            tracing::warn!("begin_pass while a pass is open, previous pass discarded");
        }
        self.uniforms = Some(*uniforms);
        self.submissions.clear();
        self.in_pass = true;
    }

    fn submit(&mut self, handle: MeshHandle, mesh: &dyn AnimatedMesh, world: Mat4) {
        if !self.in_pass {
            tracing::warn!(mesh = mesh.name(), "submit outside a pass ignored");
            return;
        }
        self.submissions.push(Submission {
            handle,
            mesh_name: mesh.name().to_string(),
            world,
            pose: mesh.pose(),
        });
    }

    fn end_pass(&mut self) -> usize {
        self.in_pass = false;
        self.passes += 1;
        self.submissions.len()
    }
}

impl fmt::Display for RecordingMeshRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pass {} ({} draw calls) ===", self.passes, self.submissions.len())?;
        if let Some(uniforms) = &self.uniforms {
            let (eye, light) = (uniforms.eye, uniforms.light_position);
            writeln!(
                f,
                "Eye: ({:.2}, {:.2}, {:.2})  Light: ({:.1}, {:.1}, {:.1})",
                eye.x, eye.y, eye.z, light.x, light.y, light.z
            )?;
        }
        for submission in &self.submissions {
            let p = submission.world.w_axis;
            writeln!(
                f,
                "  {:<10} pos=({:.2}, {:.2}, {:.2}) pose={:?}",
                submission.mesh_name, p.x, p.y, p.z, submission.pose
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_assets::{ClipSelection, PlaceholderMesh};
    use scenekit_common::Aabb;

    fn uniforms() -> PassUniforms {
        PassUniforms {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            light_position: Vec3::splat(100.0),
            light_color: Vec3::ONE,
            eye: Vec3::new(0.0, 5.0, 15.0),
        }
    }

    #[test]
    fn records_pose_at_submit_time() {
        let mut mesh = PlaceholderMesh::new("character", Aabb::default()).with_clips(["a", "b"]);
        let mut renderer = RecordingMeshRenderer::new();

        renderer.begin_pass(&uniforms());
        mesh.animate(ClipSelection::Clip(0), 1.0);
        renderer.submit(MeshHandle(0), &mesh, Mat4::IDENTITY);
        mesh.animate(ClipSelection::Clip(1), 2.0);
        renderer.submit(MeshHandle(0), &mesh, Mat4::from_translation(Vec3::X));
        assert_eq!(renderer.end_pass(), 2);

        let poses: Vec<AnimationPose> = renderer.submissions().iter().map(|s| s.pose).collect();
        assert_eq!(
            poses,
            vec![
                AnimationPose::Clip { clip: 0, time: 1.0 },
                AnimationPose::Clip { clip: 1, time: 2.0 },
            ]
        );
    }

    #[test]
    fn new_pass_clears_previous_submissions() {
        let mesh = PlaceholderMesh::new("m", Aabb::default());
        let mut renderer = RecordingMeshRenderer::new();
        renderer.begin_pass(&uniforms());
        renderer.submit(MeshHandle(0), &mesh, Mat4::IDENTITY);
        renderer.end_pass();

        renderer.begin_pass(&uniforms());
        assert_eq!(renderer.end_pass(), 0);
        assert_eq!(renderer.passes(), 2);
    }

    #[test]
    fn submit_outside_pass_is_dropped() {
        let mesh = PlaceholderMesh::new("m", Aabb::default());
        let mut renderer = RecordingMeshRenderer::new();
        renderer.submit(MeshHandle(0), &mesh, Mat4::IDENTITY);
        assert!(renderer.submissions().is_empty());
    }

    #[test]
    fn display_lists_submissions() {
        let mesh = PlaceholderMesh::new("grass", Aabb::default());
        let mut renderer = RecordingMeshRenderer::new();
        renderer.begin_pass(&uniforms());
        renderer.submit(MeshHandle(0), &mesh, Mat4::IDENTITY);
        renderer.end_pass();

        let text = renderer.to_string();
        assert!(text.contains("1 draw calls"));
        assert!(text.contains("grass"));
    }
}
