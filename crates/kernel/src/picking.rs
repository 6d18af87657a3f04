use glam::{IVec2, Vec2};
use scenekit_common::Ray;
use scenekit_input::MouseState;

use crate::frame::FrameMatrices;
use crate::instances::{InstanceSlot, SceneInstances};
use crate::player::PlayerRig;

/// Instances the view ray is tested against, in evaluation order.
pub const VIEW_RAY_TARGETS: [InstanceSlot; 3] = [
    InstanceSlot::Character2,
    InstanceSlot::Character3,
    InstanceSlot::Prop,
];

/// Diagnostic outcome of one frame's ray queries. Nothing in the scene is
/// changed by picking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickReport {
    /// Every target the view ray hit, with its distance along the ray.
    pub view_hits: Vec<(InstanceSlot, f32)>,
    /// Ray under the cursor when the right button was held.
    pub mouse_ray: Option<Ray>,
}

/// Test the player's view ray against the target instances and, while the
/// right button is held, unproject the cursor into a world ray.
///
/// `rig.view_ray_hit` receives the contact point of the first target hit in
/// evaluation order, nearest or not. The mouse ray uses `matrices` from the
/// most recent render and the last stored mouse sample.
pub fn picking_system(
    rig: &mut PlayerRig,
    instances: &SceneInstances,
    matrices: &FrameMatrices,
    mouse: &MouseState,
    mouse_sample: Option<IVec2>,
) -> PickReport {
    let _span = tracing::info_span!("picking").entered();
    let mut report = PickReport::default();

    rig.view_ray_hit = None;
    for slot in VIEW_RAY_TARGETS {
        let hit = rig.view_ray.intersect_aabb(&instances.get(slot).aabb);
        tracing::debug!(slot = slot.label(), distance = ?hit, "view ray test");
        if let Some(t) = hit {
            report.view_hits.push((slot, t));
            if rig.view_ray_hit.is_none() {
                rig.view_ray_hit = Some(rig.view_ray.at(t));
            }
        }
    }

    if mouse.right {
        if let Some(sample) = mouse_sample {
            let height = matrices.window_size.y as f32;
            let window = Vec2::new(sample.x as f32, height - sample.y as f32);
            report.mouse_ray = matrices.unproject(window);
            match report.mouse_ray {
                Some(ray) => tracing::info!(origin = ?ray.origin, dir = ?ray.dir, "mouse pick ray"),
                None => tracing::debug!("mouse pick skipped, no frame rendered yet"),
            }
        }
    }
    report
}
