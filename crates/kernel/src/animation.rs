use scenekit_assets::{AssetError, ClipSelection, MeshTable};
use scenekit_ecs::{JoinExt, Locomotion, Tables};

use crate::config::AnimationConfig;

/// Global switches for the locomotion state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    pub use_blending: bool,
    pub use_debug_blend: bool,
    pub debug_blend_factor: f32,
    pub playback_speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self::from(&AnimationConfig::default())
    }
}

impl From<&AnimationConfig> for AnimationSettings {
    fn from(config: &AnimationConfig) -> Self {
        Self {
            use_blending: config.use_blending,
            use_debug_blend: config.use_debug_blend,
            debug_blend_factor: config.debug_blend_factor,
            playback_speed: config.playback_speed,
        }
    }
}

/// Clip index playing each locomotion state. Clip 0 is the rest pose.
pub fn locomotion_clip(state: Locomotion) -> usize {
    match state {
        Locomotion::Idle => 1,
        Locomotion::Walking => 2,
        Locomotion::Running => 3,
    }
}

/// Classify each animated entity's speed and pose its mesh.
///
/// The blend factor is read before the ramp advances, so the first frame
/// after a transition samples the outgoing clip only.
pub fn animation_system(
    tables: &mut Tables,
    meshes: &mut MeshTable,
    settings: &AnimationSettings,
    dt: f32,
    time: f32,
) -> Result<(), AssetError> {
    let _span = tracing::info_span!("animation_fsm").entered();
    let t = time * settings.playback_speed;

    let view = tables
        .animations
        .iter_mut()
        .join(tables.velocities.iter())
        .join(tables.meshes.iter());
    for (id, ((anim, velocity), mesh_ref)) in view {
        let mesh = meshes.get_mut(mesh_ref.0)?;

        let previous = anim.state();
        if anim.observe(Locomotion::classify(velocity.speed())) {
            tracing::debug!(
                %id,
                from = previous.label(),
                to = anim.state().label(),
                "locomotion transition"
            );
        }
        let current = locomotion_clip(anim.state());

        if settings.use_blending {
            let factor = if settings.use_debug_blend {
                settings.debug_blend_factor.clamp(0.0, 1.0)
            } else {
                anim.blend_factor()
            };
            match anim.blend_from() {
                Some(from) => mesh.animate_blend(locomotion_clip(from), current, t, t, factor),
                None => mesh.animate(ClipSelection::Clip(current), t),
            }
        } else {
            mesh.animate(ClipSelection::Clip(current), t);
        }
        anim.advance(dt);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use scenekit_assets::{AnimationPose, MeshHandle, PlaceholderMesh};
    use scenekit_common::{Aabb, EntityId};
    use scenekit_ecs::{AnimationState, MeshRef, Velocity};

    fn rig(speed: f32) -> (Tables, MeshTable, EntityId, MeshHandle) {
        let mut meshes = MeshTable::new();
        let handle = meshes.insert(
            PlaceholderMesh::new("character", Aabb::new(Vec3::ZERO, Vec3::ONE))
                .with_clips(["t-pose", "idle", "walking", "running"]),
        );
        let mut tables = Tables::default();
        let id = EntityId::new(0, 0);
        tables.animations.insert(id, AnimationState::default());
        tables.velocities.insert(id, Velocity(Vec3::X * speed));
        tables.meshes.insert(id, MeshRef(handle));
        (tables, meshes, id, handle)
    }

    fn hard_switch() -> AnimationSettings {
        AnimationSettings {
            use_blending: false,
            ..AnimationSettings::default()
        }
    }

    #[test]
    fn hard_switch_plays_state_clip() {
        let (mut tables, mut meshes, id, h) = rig(8.0);
        animation_system(&mut tables, &mut meshes, &hard_switch(), 0.1, 2.0).unwrap();
        assert_eq!(tables.animations.get(id).unwrap().state(), Locomotion::Running);
        assert_eq!(meshes.get(h).unwrap().pose(), AnimationPose::Clip { clip: 3, time: 2.0 });
    }

    #[test]
    fn playback_speed_scales_time() {
        let (mut tables, mut meshes, _, h) = rig(0.0);
        let settings = AnimationSettings {
            playback_speed: 0.5,
            ..hard_switch()
        };
        animation_system(&mut tables, &mut meshes, &settings, 0.1, 3.0).unwrap();
        assert_eq!(meshes.get(h).unwrap().pose(), AnimationPose::Clip { clip: 1, time: 1.5 });
    }

    #[test]
    fn blend_ramps_from_previous_clip() {
        let (mut tables, mut meshes, id, h) = rig(6.0);
        let settings = AnimationSettings::default();

        animation_system(&mut tables, &mut meshes, &settings, 0.25, 1.0).unwrap();
        assert_eq!(
            meshes.get(h).unwrap().pose(),
            AnimationPose::Blend { from: 1, to: 2, from_time: 1.0, to_time: 1.0, factor: 0.0 }
        );

        animation_system(&mut tables, &mut meshes, &settings, 0.25, 1.25).unwrap();
        assert!(matches!(
            meshes.get(h).unwrap().pose(),
            AnimationPose::Blend { factor, .. } if (factor - 0.5).abs() < 1e-6
        ));

        animation_system(&mut tables, &mut meshes, &settings, 0.25, 1.5).unwrap();
        assert!(matches!(
            meshes.get(h).unwrap().pose(),
            AnimationPose::Blend { factor, .. } if factor == 1.0
        ));
        assert_eq!(tables.animations.get(id).unwrap().blend_from(), Some(Locomotion::Idle));
    }

    #[test]
    fn no_transition_yet_plays_current_clip() {
        let (mut tables, mut meshes, _, h) = rig(0.0);
        animation_system(&mut tables, &mut meshes, &AnimationSettings::default(), 0.1, 0.4)
            .unwrap();
        assert_eq!(meshes.get(h).unwrap().pose(), AnimationPose::Clip { clip: 1, time: 0.4 });
    }

    #[test]
    fn debug_override_pins_factor() {
        let (mut tables, mut meshes, _, h) = rig(6.0);
        let settings = AnimationSettings {
            use_debug_blend: true,
            debug_blend_factor: 0.3,
            ..AnimationSettings::default()
        };
        animation_system(&mut tables, &mut meshes, &settings, 0.1, 0.0).unwrap();
        assert!(matches!(
            meshes.get(h).unwrap().pose(),
            AnimationPose::Blend { factor, .. } if (factor - 0.3).abs() < 1e-6
        ));
    }

    #[test]
    fn unknown_mesh_is_reported() {
        let (mut tables, _, id, _) = rig(0.0);
        tables.meshes.insert(id, MeshRef(MeshHandle(7)));
        let mut empty = MeshTable::new();
        let err = animation_system(&mut tables, &mut empty, &hard_switch(), 0.1, 0.0).unwrap_err();
        assert!(matches!(err, AssetError::UnknownMesh(MeshHandle(7))));
    }
}
