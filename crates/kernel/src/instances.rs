//! Fixed scene instances that live outside the entity store: the ground,
//! a decorative prop and three character slots, plus the orbiting light.

use glam::{Mat4, Quat, Vec3};
use scenekit_assets::{AssetError, ClipSelection, MeshHandle, MeshTable, PlaceholderMesh};
use scenekit_common::{Aabb, trs_y};
use serde::{Deserialize, Serialize};

use crate::config::LightConfig;

/// Meshes the scene is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneMeshes {
    pub ground: MeshHandle,
    pub prop: MeshHandle,
    /// Skinned character used by the player and the three character slots.
    pub character: MeshHandle,
    /// Small creature used by the NPC and the wanderer.
    pub wanderer: MeshHandle,
}

impl SceneMeshes {
    pub fn all(&self) -> [MeshHandle; 4] {
        [self.ground, self.prop, self.character, self.wanderer]
    }

    /// Register geometry-free stand-ins with the reference scene's bounds,
    /// clips and character skeleton, for headless runs.
    pub fn register_placeholders(table: &mut MeshTable) -> Result<Self, AssetError> {
        let joints = [
            Mat4::from_translation(Vec3::new(0.0, 100.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 140.0, 0.0)),
            Mat4::from_translation(Vec3::new(0.0, 170.0, 0.0)),
        ];
        let character = PlaceholderMesh::new(
            "character",
            Aabb::new(Vec3::new(-50.0, 0.0, -30.0), Vec3::new(50.0, 180.0, 30.0)),
        )
        .with_clips(["t-pose", "idle", "walking", "running"])
        .with_bind_pose_joints(&joints)?;

        Ok(Self {
            ground: table.insert(PlaceholderMesh::new(
                "grass",
                Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)),
            )),
            prop: table.insert(
                PlaceholderMesh::new(
                    "horse",
                    Aabb::new(Vec3::new(-60.0, 0.0, -220.0), Vec3::new(60.0, 240.0, 220.0)),
                )
                .with_clips(["idle", "eat", "walk", "gallop"]),
            ),
            character: table.insert(character),
            wanderer: table.insert(
                PlaceholderMesh::new(
                    "fox",
                    Aabb::new(Vec3::new(-20.0, 0.0, -60.0), Vec3::new(20.0, 50.0, 60.0)),
                )
                .with_clips(["survey", "walk", "run"]),
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstanceSlot {
    Ground,
    Prop,
    Character1,
    Character2,
    Character3,
}

impl InstanceSlot {
    pub const ALL: [InstanceSlot; 5] = [
        Self::Ground,
        Self::Prop,
        Self::Character1,
        Self::Character2,
        Self::Character3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Prop => "prop",
            Self::Character1 => "character 1",
            Self::Character2 => "character 2",
            Self::Character3 => "character 3",
        }
    }

    /// Clip and time this slot is posed with. `None` for static meshes.
    ///
    /// `time` is raw scene time; character slots play at `playback_speed`
    /// and the first one follows the user-selected clip.
    pub fn clip_schedule(
        self,
        time: f32,
        playback_speed: f32,
        character_clip: ClipSelection,
    ) -> Option<(ClipSelection, f32)> {
        let scaled = time * playback_speed;
        match self {
            Self::Ground => None,
            Self::Prop => Some((ClipSelection::Clip(3), time)),
            Self::Character1 => Some((character_clip, scaled)),
            Self::Character2 => Some((ClipSelection::Clip(1), scaled)),
            Self::Character3 => Some((ClipSelection::Clip(2), scaled)),
        }
    }

    /// World matrix of this slot at `time`.
    pub fn world_matrix(self, time: f32, player_position: Vec3) -> Mat4 {
        let spin = (time * 50.0).to_radians();
        match self {
            Self::Ground => trs_y(Vec3::ZERO, 0.0, Vec3::splat(100.0)),
            Self::Prop => trs_y(
                Vec3::new(30.0, 0.0, -35.0),
                35f32.to_radians(),
                Vec3::splat(0.01),
            ),
            Self::Character1 => trs_y(player_position, 0.0, Vec3::splat(0.03)),
            Self::Character2 => trs_y(Vec3::new(-3.0, 0.0, 0.0), spin, Vec3::splat(0.03)),
            Self::Character3 => trs_y(Vec3::new(3.0, 0.0, 0.0), spin, Vec3::splat(0.03)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneInstance {
    pub slot: InstanceSlot,
    pub mesh: MeshHandle,
    pub world: Mat4,
    /// World-space bounds for the current `world`.
    pub aabb: Aabb,
}

/// The five fixed instances, indexed by slot.
#[derive(Debug, Clone)]
pub struct SceneInstances {
    instances: [SceneInstance; 5],
}

impl SceneInstances {
    pub fn new(meshes: &SceneMeshes) -> Self {
        let instances = InstanceSlot::ALL.map(|slot| SceneInstance {
            slot,
            mesh: match slot {
                InstanceSlot::Ground => meshes.ground,
                InstanceSlot::Prop => meshes.prop,
                _ => meshes.character,
            },
            world: Mat4::IDENTITY,
            aabb: Aabb::EMPTY,
        });
        Self { instances }
    }

    pub fn get(&self, slot: InstanceSlot) -> &SceneInstance {
        &self.instances[slot as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneInstance> {
        self.instances.iter()
    }

    /// Recompute every world matrix and bound for `time`.
    pub fn refresh(
        &mut self,
        time: f32,
        player_position: Vec3,
        meshes: &MeshTable,
    ) -> Result<(), AssetError> {
        for instance in &mut self.instances {
            instance.world = instance.slot.world_matrix(time, player_position);
            instance.aabb = meshes.get(instance.mesh)?.model_aabb().transform(&instance.world);
        }
        Ok(())
    }
}

/// Point light circling the scene about +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub orbit_rate: f32,
    pub orbit_offset: Vec3,
}

impl PointLight {
    pub fn from_config(config: &LightConfig) -> Self {
        Self {
            position: config.orbit_offset,
            color: config.color,
            orbit_rate: config.orbit_rate,
            orbit_offset: config.orbit_offset,
        }
    }

    pub fn orbit(&mut self, time: f32) {
        self.position = Quat::from_rotation_y(time * self.orbit_rate) * self.orbit_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (MeshTable, SceneMeshes) {
        let mut table = MeshTable::new();
        let unit = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let meshes = SceneMeshes {
            ground: table.insert(PlaceholderMesh::new("grass", unit)),
            prop: table.insert(PlaceholderMesh::new("horse", unit)),
            character: table.insert(PlaceholderMesh::new("character", unit)),
            wanderer: table.insert(PlaceholderMesh::new("fox", unit)),
        };
        (table, meshes)
    }

    #[test]
    fn first_character_follows_player() {
        let (table, meshes) = table();
        let mut instances = SceneInstances::new(&meshes);
        instances.refresh(0.0, Vec3::new(4.0, 0.0, -2.0), &table).unwrap();

        let slot = instances.get(InstanceSlot::Character1);
        assert_eq!(slot.mesh, meshes.character);
        assert!(slot.aabb.center().abs_diff_eq(Vec3::new(4.0, 0.0, -2.0), 1e-5));
        assert!(slot.aabb.max.abs_diff_eq(Vec3::new(4.03, 0.03, -1.97), 1e-5));
    }

    #[test]
    fn ground_is_scaled_up() {
        let (table, meshes) = table();
        let mut instances = SceneInstances::new(&meshes);
        instances.refresh(0.0, Vec3::ZERO, &table).unwrap();
        assert!(instances.get(InstanceSlot::Ground).aabb.max.abs_diff_eq(Vec3::splat(100.0), 1e-4));
    }

    #[test]
    fn spinning_slots_keep_their_place() {
        let (table, meshes) = table();
        let mut instances = SceneInstances::new(&meshes);
        instances.refresh(1.3, Vec3::ZERO, &table).unwrap();
        let center = instances.get(InstanceSlot::Character3).aabb.center();
        assert!(center.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn unknown_mesh_fails_refresh() {
        let (_, meshes) = table();
        let mut instances = SceneInstances::new(&meshes);
        assert!(instances.refresh(0.0, Vec3::ZERO, &MeshTable::new()).is_err());
    }

    #[test]
    fn placeholders_cover_every_clip_the_scene_plays() {
        let mut table = MeshTable::new();
        let meshes = SceneMeshes::register_placeholders(&mut table).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(meshes.character).unwrap().animation_count(), 4);
        assert!(table.get(meshes.prop).unwrap().animation_count() > 3);
        let skeleton = table.get(meshes.character).unwrap();
        assert_eq!(skeleton.bone_matrices().len(), skeleton.inverse_bind_matrices().len());
    }

    #[test]
    fn clip_schedule_per_slot() {
        let pick = ClipSelection::BindPose;
        assert_eq!(InstanceSlot::Ground.clip_schedule(2.0, 0.5, pick), None);
        assert_eq!(
            InstanceSlot::Prop.clip_schedule(2.0, 0.5, pick),
            Some((ClipSelection::Clip(3), 2.0))
        );
        assert_eq!(
            InstanceSlot::Character1.clip_schedule(2.0, 0.5, pick),
            Some((ClipSelection::BindPose, 1.0))
        );
        assert_eq!(
            InstanceSlot::Character3.clip_schedule(2.0, 0.5, pick),
            Some((ClipSelection::Clip(2), 1.0))
        );
    }

    #[test]
    fn light_orbits_about_y() {
        let mut light = PointLight::from_config(&LightConfig::default());
        light.orbit(0.0);
        assert!(light.position.abs_diff_eq(Vec3::splat(100.0), 1e-4));
        light.orbit(std::f32::consts::PI * 10.0);
        assert!(light.position.abs_diff_eq(Vec3::new(-100.0, 100.0, -100.0), 1e-3));
    }
}
