//! Model behind the settings panels. The UI layer edits plain scene fields
//! directly; the helpers here cover the writes that fan out over entities
//! and the labels the panels display.

use glam::Vec2;
use scenekit_assets::ClipSelection;
use scenekit_common::window_coords_from_world;
use scenekit_ecs::JoinExt;
use scenekit_kernel::{InstanceSlot, Scene};
use std::fmt;

use crate::inspector::player_locomotion;

/// Apply `scale` to every entity drawn with the wanderer mesh. Returns how
/// many were changed.
pub fn set_wanderer_scale(scene: &mut Scene, scale: f32) -> usize {
    let wanderer = scene.slots.wanderer;
    let tables = scene.store.tables_mut();
    let mut changed = 0;
    for (_, (transform, mesh)) in tables.transforms.iter_mut().join(tables.meshes.iter()) {
        if mesh.0 == wanderer {
            *transform = transform.with_uniform_scale(scale);
            changed += 1;
        }
    }
    tracing::debug!(scale, changed, "wanderer scale set");
    changed
}

/// Set the route speed of the first NPC. Returns false if there is none.
pub fn set_npc_speed(scene: &mut Scene, speed: f32) -> bool {
    match scene.store.tables_mut().npcs.iter_mut().next() {
        Some((id, npc)) => {
            npc.speed = speed;
            tracing::debug!(%id, speed, "npc speed set");
            true
        }
        None => false,
    }
}

/// Current value of the first NPC's speed slider.
pub fn npc_speed(scene: &Scene) -> Option<f32> {
    scene.store.tables().npcs.iter().next().map(|(_, npc)| npc.speed)
}

/// Entries for the character clip selector: bind pose, then every clip of
/// the character mesh by name.
pub fn clip_options(scene: &Scene) -> Vec<(ClipSelection, String)> {
    let mut options = vec![(ClipSelection::BindPose, "Bind pose".to_string())];
    if let Ok(mesh) = scene.meshes.get(scene.slots.character) {
        options.extend((0..mesh.animation_count()).map(|i| {
            let name = mesh.animation_name(i).map_or_else(|| format!("Clip {i}"), str::to_string);
            (ClipSelection::Clip(i), name)
        }));
    }
    options
}

/// Label of the selected character clip.
pub fn clip_label(scene: &Scene) -> String {
    let selected = scene.settings.character_clip;
    clip_options(scene)
        .into_iter()
        .find(|(clip, _)| *clip == selected)
        .map_or_else(|| selected.to_string(), |(_, name)| name)
}

pub fn fsm_state_label(scene: &Scene) -> &'static str {
    player_locomotion(scene).map_or("None", |state| state.label())
}

/// Figures shown in the game info panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameInfo {
    pub frame: u64,
    pub draw_calls: usize,
}

impl GameInfo {
    pub fn of(scene: &Scene) -> Self {
        Self {
            frame: scene.frame(),
            draw_calls: scene.draw_calls,
        }
    }
}

impl fmt::Display for GameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {} | Draw calls {}", self.frame, self.draw_calls)
    }
}

/// Window position (origin top-left) of the in-world label over the prop.
/// `None` before the first render or while the prop is behind the camera.
pub fn label_anchor(scene: &Scene) -> Option<Vec2> {
    if !scene.matrices.has_area() {
        return None;
    }
    let prop = scene.instances.get(InstanceSlot::Prop).world.w_axis.truncate();
    let window = window_coords_from_world(prop, &scene.matrices.viewport_projection_view())?;
    Some(Vec2::new(window.x, scene.matrices.window_size.y as f32 - window.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{UVec2, Vec3};
    use scenekit_assets::MeshTable;
    use scenekit_ecs::Transform;
    use scenekit_input::InputSnapshot;
    use scenekit_kernel::{FrameMatrices, SceneConfig, SceneMeshes};

    fn scene() -> Scene {
        let mut meshes = MeshTable::new();
        let slots = SceneMeshes::register_placeholders(&mut meshes).unwrap();
        Scene::reference(SceneConfig::default(), meshes, slots).unwrap()
    }

    #[test]
    fn wanderer_scale_applies_to_every_fox() {
        let mut scene = scene();
        assert_eq!(set_wanderer_scale(&mut scene, 0.05), 2);
        let ids = scene.store.entities().collect::<Vec<_>>();
        assert_eq!(scene.store.get::<Transform>(ids[0]).unwrap().scale, Vec3::splat(0.05));
        assert_eq!(scene.store.get::<Transform>(ids[1]).unwrap().scale, Vec3::splat(0.01));
        assert_eq!(scene.store.get::<Transform>(ids[2]).unwrap().scale, Vec3::splat(0.05));
    }

    #[test]
    fn npc_speed_round_trip() {
        let mut scene = scene();
        assert_eq!(npc_speed(&scene), Some(2.0));
        assert!(set_npc_speed(&mut scene, 4.5));
        assert_eq!(npc_speed(&scene), Some(4.5));
    }

    #[test]
    fn npc_speed_without_npc() {
        let mut scene = scene();
        let npc = scene.store.entities().next().unwrap();
        scene.despawn(npc).unwrap();
        assert!(!set_npc_speed(&mut scene, 1.0));
        assert_eq!(npc_speed(&scene), None);
    }

    #[test]
    fn clip_labels() {
        let mut scene = scene();
        assert_eq!(clip_label(&scene), "Bind pose");
        scene.settings.character_clip = ClipSelection::Clip(2);
        assert_eq!(clip_label(&scene), "walking");
        scene.settings.character_clip = ClipSelection::Clip(9);
        assert_eq!(clip_label(&scene), "clip 9");
        assert_eq!(clip_options(&scene).len(), 5);
    }

    #[test]
    fn fsm_label_follows_player() {
        let mut scene = scene();
        assert_eq!(fsm_state_label(&scene), "Idle");
        scene.player.max_speed = 9.0;
        scene
            .update(0.0, 0.1, &InputSnapshot::with_keys([scenekit_input::Key::W]))
            .unwrap();
        assert_eq!(fsm_state_label(&scene), "Running");
    }

    #[test]
    fn game_info_display() {
        let scene = scene();
        assert_eq!(GameInfo::of(&scene).to_string(), "Frame 0 | Draw calls 0");
    }

    #[test]
    fn label_anchor_needs_a_rendered_frame() {
        let mut scene = scene();
        assert_eq!(label_anchor(&scene), None);

        scene.update(0.0, 0.016, &InputSnapshot::new()).unwrap();
        // Look at the prop from the origin side so it is in front of the eye.
        scene.camera.set_look_at(Vec3::new(30.0, 0.0, -35.0));
        scene.matrices = FrameMatrices::compute(&scene.camera, UVec2::new(800, 600));
        let anchor = label_anchor(&scene).unwrap();
        assert!(anchor.abs_diff_eq(Vec2::new(400.0, 300.0), 0.5));
    }

    #[test]
    fn label_anchor_above_look_at_sits_higher_on_screen() {
        let mut scene = scene();
        scene.update(0.0, 0.016, &InputSnapshot::new()).unwrap();
        // Aim below the prop so it lands in the upper half of the window.
        scene.camera.set_look_at(Vec3::new(30.0, -3.0, -35.0));
        scene.matrices = FrameMatrices::compute(&scene.camera, UVec2::new(800, 600));
        let anchor = label_anchor(&scene).unwrap();
        assert!((anchor.x - 400.0).abs() < 0.5);
        assert!(anchor.y < 250.0, "expected upper half, got {anchor}");
        assert!(anchor.y > 0.0);
    }
}
