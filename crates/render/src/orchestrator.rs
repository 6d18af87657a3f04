use glam::{UVec2, Vec3};
use scenekit_assets::AssetError;
use scenekit_ecs::JoinExt;
use scenekit_kernel::{FrameMatrices, InstanceSlot, Scene};
use std::fmt;

use crate::renderer::{MeshRenderer, PassUniforms};
use crate::shapes::{Color4u, ShapeRenderer, ShapeRendererExt};

/// Instance bounds color in the debug overlay.
pub const AABB_COLOR: Color4u = Color4u(0xffe6_1a80);
/// View-ray length when nothing was hit.
pub const VIEW_RAY_LENGTH: f32 = 100.0;
/// Length of each bone gizmo axis, in mesh units before world scale.
pub const GIZMO_AXIS_LENGTH: f32 = 25.0;
/// Instance whose world matrix places the skeleton gizmos. It is the last
/// character slot posed, so the shared mesh holds its pose.
pub const GIZMO_SLOT: InstanceSlot = InstanceSlot::Character3;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// What one `render_frame` call submitted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub entity_submissions: usize,
    pub instance_submissions: usize,
    pub draw_calls: usize,
    /// Bones drawn as gizmos, zero when gizmos are off.
    pub gizmo_bones: usize,
    pub view_ray_hit: Option<Vec3>,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {}: {} draw calls ({} entities, {} instances), {} gizmo bones, view ray ",
            self.frame,
            self.draw_calls,
            self.entity_submissions,
            self.instance_submissions,
            self.gizmo_bones
        )?;
        match self.view_ray_hit {
            Some(p) => write!(f, "hit at ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z),
            None => f.write_str("clear"),
        }
    }
}

/// Draw one frame of `scene`.
///
/// Order: frame matrices, pass begin, entity meshes, fixed instances (posed
/// and re-bounded just before submission), pass end, bone gizmos, debug
/// shapes and the batch flush.
pub fn render_frame(
    scene: &mut Scene,
    renderer: &mut dyn MeshRenderer,
    shapes: &mut dyn ShapeRenderer,
    time: f32,
    window: UVec2,
) -> Result<FrameReport, RenderError> {
    let _span = tracing::info_span!("render_frame", frame = scene.frame()).entered();

    let matrices = FrameMatrices::compute(&scene.camera, window);
    scene.matrices = matrices;

    renderer.begin_pass(&PassUniforms {
        projection: matrices.projection,
        view: matrices.view,
        light_position: scene.light.position,
        light_color: scene.light.color,
        eye: scene.camera.position(),
    });

    let mut entity_submissions = 0;
    let tables = scene.store.tables();
    for (_, (transform, mesh_ref)) in tables.transforms.iter().join(tables.meshes.iter()) {
        let mesh = scene.meshes.get(mesh_ref.0)?;
        renderer.submit(mesh_ref.0, mesh, transform.world_matrix());
        entity_submissions += 1;
    }

    scene
        .instances
        .refresh(time, scene.player.position, &scene.meshes)?;
    let mut instance_submissions = 0;
    for instance in scene.instances.iter() {
        let mesh = scene.meshes.get_mut(instance.mesh)?;
        let schedule = instance.slot.clip_schedule(
            time,
            scene.settings.animation.playback_speed,
            scene.settings.character_clip,
        );
        if let Some((clip, t)) = schedule {
            mesh.animate(clip, t);
        }
        renderer.submit(instance.mesh, mesh, instance.world);
        instance_submissions += 1;
    }

    let draw_calls = renderer.end_pass();
    scene.draw_calls = draw_calls;

    let gizmo_bones = if scene.settings.show_bone_gizmos {
        draw_bone_gizmos(scene, shapes)?
    } else {
        0
    };

    draw_debug_overlay(scene, shapes);
    shapes.flush(matrices.view_projection());

    let report = FrameReport {
        frame: scene.frame(),
        entity_submissions,
        instance_submissions,
        draw_calls,
        gizmo_bones,
        view_ray_hit: scene.player.view_ray_hit,
    };
    tracing::debug!(%report, "frame rendered");
    Ok(report)
}

/// Axis lines at every bone of the character skeleton.
fn draw_bone_gizmos(scene: &Scene, shapes: &mut dyn ShapeRenderer) -> Result<usize, RenderError> {
    let instance = scene.instances.get(GIZMO_SLOT);
    let mesh = scene.meshes.get(instance.mesh)?;
    let bones = mesh.bone_matrices();
    let inverse_binds = mesh.inverse_bind_matrices();

    for (bone, inverse_bind) in bones.iter().zip(inverse_binds) {
        let global = instance.world * *bone * inverse_bind.inverse();
        let origin = global.w_axis.truncate();
        let axes = [
            (global.x_axis.truncate(), Color4u::RED),
            (global.y_axis.truncate(), Color4u::GREEN),
            (global.z_axis.truncate(), Color4u::BLUE),
        ];
        for (axis, color) in axes {
            let mut scope = shapes.color_scope(color);
            scope.push_line(origin, origin + axis * GIZMO_AXIS_LENGTH);
        }
    }
    Ok(bones.len().min(inverse_binds.len()))
}

/// View ray, a basis per instance and every instance bound.
fn draw_debug_overlay(scene: &Scene, shapes: &mut dyn ShapeRenderer) {
    let ray = scene.player.view_ray;
    match scene.player.view_ray_hit {
        Some(contact) => shapes
            .color_scope(Color4u::GREEN)
            .push_line(ray.origin, contact),
        None => shapes
            .color_scope(Color4u::WHITE)
            .push_line(ray.origin, ray.at(VIEW_RAY_LENGTH)),
    }

    for instance in scene.instances.iter() {
        shapes.push_basis(&instance.world, 1.0);
    }

    let mut scope = shapes.color_scope(AABB_COLOR);
    for instance in scene.instances.iter() {
        scope.push_aabb(&instance.aabb);
    }
}
