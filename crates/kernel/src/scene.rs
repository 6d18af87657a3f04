use glam::Vec3;
use scenekit_assets::{AssetError, ClipSelection, MeshTable};
use scenekit_common::EntityId;
use scenekit_ecs::{
    AnimationState, EntityStore, MeshRef, NpcController, PlayerController, StoreError, Transform,
    Velocity,
};
use scenekit_input::{InputSnapshot, Key};

use crate::animation::{AnimationSettings, animation_system};
use crate::camera::OrbitCamera;
use crate::config::{NpcConfig, PlayerConfig, SceneConfig, WandererConfig};
use crate::frame::FrameMatrices;
use crate::instances::{PointLight, SceneInstances, SceneMeshes};
use crate::movement::{movement_system, player_anchor};
use crate::npc::npc_waypoint_system;
use crate::picking::{PickReport, picking_system};
use crate::player::{PlayerRig, player_control_system};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Values the UI layer reads and writes directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub animation: AnimationSettings,
    /// Clip for the first character slot; bind pose allowed.
    pub character_clip: ClipSelection,
    pub show_bone_gizmos: bool,
}

/// The whole simulated scene: entities, fixed instances, camera, light and
/// the per-frame derived state the renderer and UI read back.
///
/// `update` runs the systems in a fixed order: camera, player control,
/// movement, camera follow, NPC routes, animation, instance refresh, picking.
#[derive(Debug)]
pub struct Scene {
    pub store: EntityStore,
    pub meshes: MeshTable,
    pub slots: SceneMeshes,
    pub camera: OrbitCamera,
    pub player: PlayerRig,
    pub light: PointLight,
    pub settings: SceneSettings,
    pub instances: SceneInstances,
    /// Matrices from the most recent render.
    pub matrices: FrameMatrices,
    pub last_pick: PickReport,
    /// Draw calls reported by the last finished pass.
    pub draw_calls: usize,
    config: SceneConfig,
    frame: u64,
}

impl Scene {
    /// Build an empty scene. Every handle in `slots` must resolve in `meshes`.
    pub fn new(
        config: SceneConfig,
        meshes: MeshTable,
        slots: SceneMeshes,
    ) -> Result<Self, SceneError> {
        for handle in slots.all() {
            meshes.get(handle)?;
        }
        Ok(Self {
            store: EntityStore::new(),
            slots,
            camera: OrbitCamera::from_config(&config.camera),
            player: PlayerRig::new(config.player.spawn, config.player.max_speed),
            light: PointLight::from_config(&config.light),
            settings: SceneSettings {
                animation: AnimationSettings::from(&config.animation),
                character_clip: config.animation.character_clip,
                show_bone_gizmos: config.show_bone_gizmos,
            },
            instances: SceneInstances::new(&slots),
            matrices: FrameMatrices::default(),
            last_pick: PickReport::default(),
            draw_calls: 0,
            meshes,
            config,
            frame: 0,
        })
    }

    /// Build the reference scene: an NPC on its route, the player and a
    /// drifting wanderer, created in that order.
    pub fn reference(
        config: SceneConfig,
        meshes: MeshTable,
        slots: SceneMeshes,
    ) -> Result<Self, SceneError> {
        let mut scene = Self::new(config, meshes, slots)?;
        let npc = scene.config.npc.clone();
        let player = scene.config.player.clone();
        let wanderer = scene.config.wanderer.clone();
        scene.spawn_npc(&npc);
        scene.spawn_player(&player);
        scene.spawn_wanderer(&wanderer);
        tracing::info!(entities = scene.store.entity_count(), "reference scene ready");
        Ok(scene)
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn spawn_player(&mut self, config: &PlayerConfig) -> EntityId {
        let id = self.store.create();
        self.store.attach(
            id,
            Transform::from_position(config.spawn).with_uniform_scale(config.scale),
        );
        self.store.attach(id, Velocity::default());
        self.store.attach(id, MeshRef(self.slots.character));
        self.store.attach(id, PlayerController::default());
        self.store.attach(id, AnimationState::default());
        self.player.max_speed = config.max_speed;
        self.player.set_position(config.spawn);
        id
    }

    pub fn spawn_npc(&mut self, config: &NpcConfig) -> EntityId {
        let id = self.store.create();
        self.store.attach(
            id,
            Transform::from_position(config.spawn).with_uniform_scale(config.scale),
        );
        self.store.attach(id, Velocity::default());
        self.store.attach(id, MeshRef(self.slots.wanderer));
        self.store.attach(
            id,
            NpcController {
                behavior: config.behavior,
                ..NpcController::new(config.waypoints.clone(), config.speed)
            },
        );
        id
    }

    pub fn spawn_wanderer(&mut self, config: &WandererConfig) -> EntityId {
        let id = self.store.create();
        self.store.attach(
            id,
            Transform::from_position(config.spawn).with_uniform_scale(config.scale),
        );
        self.store.attach(id, Velocity(config.velocity));
        self.store.attach(id, MeshRef(self.slots.wanderer));
        id
    }

    pub fn despawn(&mut self, id: EntityId) -> Result<(), SceneError> {
        Ok(self.store.destroy(id)?)
    }

    /// Advance the simulation one frame. `time` is seconds since start and
    /// `dt` the length of this frame.
    pub fn update(&mut self, time: f32, dt: f32, input: &InputSnapshot) -> Result<(), SceneError> {
        let _span = tracing::debug_span!("scene_update", frame = self.frame).entered();

        self.camera.update(&input.mouse);
        if self.player.gizmo_key_pressed(input.is_key_pressed(Key::G)) {
            self.settings.show_bone_gizmos = !self.settings.show_bone_gizmos;
            tracing::info!(enabled = self.settings.show_bone_gizmos, "bone gizmos toggled");
        }

        let tables = self.store.tables_mut();
        player_control_system(tables, &mut self.player, self.camera.yaw(), input);
        movement_system(tables, dt);
        if let Some((_, position)) = player_anchor(tables) {
            self.camera.set_look_at(position);
            self.player.set_position(position);
        }
        npc_waypoint_system(tables);
        animation_system(tables, &mut self.meshes, &self.settings.animation, dt, time)?;

        self.light.orbit(time);
        self.instances.refresh(time, self.player.position, &self.meshes)?;
        self.last_pick = picking_system(
            &mut self.player,
            &self.instances,
            &self.matrices,
            &input.mouse,
            self.camera.mouse_prev(),
        );

        self.frame += 1;
        Ok(())
    }

    /// FNV-1a digest of the simulated state: frame counter, camera
    /// orientation and every transform and velocity in entity order.
    /// Identical input sequences give identical hashes.
    pub fn state_hash(&self) -> u64 {
        let mut hash = Fnv1a::default();
        hash.write(&self.frame.to_le_bytes());
        hash.write_f32s(&[self.camera.yaw(), self.camera.pitch()]);

        let tables = self.store.tables();
        for (id, transform) in tables.transforms.iter() {
            hash.write(&id.index().to_le_bytes());
            hash.write(&id.generation().to_le_bytes());
            hash.write_vec3(transform.position);
            hash.write_vec3(transform.rotation);
            hash.write_vec3(transform.scale);
        }
        for (id, velocity) in tables.velocities.iter() {
            hash.write(&id.index().to_le_bytes());
            hash.write_vec3(velocity.0);
        }
        hash.finish()
    }
}

struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self(0xcbf2_9ce4_8422_2325)
    }
}

impl Fnv1a {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 ^= u64::from(byte);
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn write_f32s(&mut self, values: &[f32]) {
        for value in values {
            self.write(&value.to_bits().to_le_bytes());
        }
    }

    fn write_vec3(&mut self, v: Vec3) {
        self.write_f32s(&v.to_array());
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use scenekit_assets::MeshHandle;
    use scenekit_ecs::Locomotion;
    use scenekit_input::MouseState;

    fn placeholder_scene(config: SceneConfig) -> Scene {
        let mut meshes = MeshTable::new();
        let slots = SceneMeshes::register_placeholders(&mut meshes).unwrap();
        Scene::new(config, meshes, slots).unwrap()
    }

    fn reference_scene() -> Scene {
        let mut meshes = MeshTable::new();
        let slots = SceneMeshes::register_placeholders(&mut meshes).unwrap();
        Scene::reference(SceneConfig::default(), meshes, slots).unwrap()
    }

    #[test]
    fn unknown_slot_mesh_is_rejected() {
        let mut meshes = MeshTable::new();
        let mut slots = SceneMeshes::register_placeholders(&mut meshes).unwrap();
        slots.prop = MeshHandle(42);
        let err = Scene::new(SceneConfig::default(), meshes, slots).unwrap_err();
        assert!(matches!(err, SceneError::Asset(AssetError::UnknownMesh(MeshHandle(42)))));
    }

    #[test]
    fn reference_scene_spawn_order() {
        let scene = reference_scene();
        let ids: Vec<EntityId> = scene.store.entities().collect();
        assert_eq!(ids.len(), 3);

        let npc = scene.store.get::<NpcController>(ids[0]).unwrap();
        assert_eq!(npc.waypoints.len(), 4);
        assert!(scene.store.has::<PlayerController>(ids[1]));
        assert!(scene.store.has::<AnimationState>(ids[1]));
        assert_eq!(scene.store.get::<Velocity>(ids[2]), Some(&Velocity(Vec3::ONE)));
        assert_eq!(
            scene.store.get::<MeshRef>(ids[2]),
            scene.store.get::<MeshRef>(ids[0])
        );
    }

    #[test]
    fn pressing_w_moves_player_down_negative_z() {
        let config = SceneConfig {
            player: PlayerConfig {
                spawn: Vec3::ZERO,
                max_speed: 6.0,
                ..PlayerConfig::default()
            },
            ..SceneConfig::default()
        };
        let mut scene = placeholder_scene(config.clone());
        let player = scene.spawn_player(&config.player);

        scene
            .update(0.0, 0.1, &InputSnapshot::with_keys([Key::W]))
            .unwrap();

        let velocity = scene.store.get::<Velocity>(player).unwrap().0;
        assert!((velocity.length() - 6.0).abs() < 1e-5);
        assert!(velocity.normalize().abs_diff_eq(Vec3::NEG_Z, 1e-6));

        let position = scene.store.get::<Transform>(player).unwrap().position;
        assert!(position.abs_diff_eq(Vec3::new(0.0, 0.0, -0.6), 1e-5));
        assert!(scene.camera.look_at.abs_diff_eq(position, 1e-6));
        assert!(scene.player.position.abs_diff_eq(position, 1e-6));
        assert_eq!(
            scene.store.get::<AnimationState>(player).unwrap().state(),
            Locomotion::Walking
        );
    }

    #[test]
    fn npc_walks_its_route() {
        let mut scene = reference_scene();
        let npc = scene.store.entities().next().unwrap();
        scene.update(0.0, 0.1, &InputSnapshot::new()).unwrap();
        // First waypoint is the origin; the NPC starts at (10, 0, 10).
        let velocity = scene.store.get::<Velocity>(npc).unwrap().0;
        assert!(velocity.abs_diff_eq(Vec3::new(-1.0, 0.0, -1.0).normalize() * 2.0, 1e-5));
    }

    #[test]
    fn g_toggles_gizmos_once_per_press() {
        let mut scene = reference_scene();
        let held = InputSnapshot::with_keys([Key::G]);
        scene.update(0.0, 0.1, &held).unwrap();
        scene.update(0.1, 0.1, &held).unwrap();
        assert!(scene.settings.show_bone_gizmos);
        scene.update(0.2, 0.1, &InputSnapshot::new()).unwrap();
        scene.update(0.3, 0.1, &held).unwrap();
        assert!(!scene.settings.show_bone_gizmos);
    }

    #[test]
    fn identical_inputs_hash_identically() {
        let script = [
            InputSnapshot::with_keys([Key::W]),
            InputSnapshot::with_keys([Key::W, Key::D]).with_mouse(MouseState {
                position: IVec2::new(100, 100),
                left: true,
                right: false,
            }),
            InputSnapshot::new().with_mouse(MouseState {
                position: IVec2::new(140, 90),
                left: true,
                right: false,
            }),
        ];
        let run = || {
            let mut scene = reference_scene();
            for (i, input) in script.iter().enumerate() {
                scene.update(i as f32 * 0.016, 0.016, input).unwrap();
            }
            scene.state_hash()
        };
        assert_eq!(run(), run());

        let mut other = reference_scene();
        other.update(0.0, 0.016, &InputSnapshot::with_keys([Key::S])).unwrap();
        assert_ne!(other.state_hash(), run());
    }

    #[test]
    fn despawn_twice_is_a_store_error() {
        let mut scene = reference_scene();
        let id = scene.store.entities().next().unwrap();
        scene.despawn(id).unwrap();
        assert!(matches!(
            scene.despawn(id),
            Err(SceneError::Store(StoreError::StaleEntity(_)))
        ));
        assert_eq!(scene.store.entity_count(), 2);
    }

    #[test]
    fn frame_counter_advances() {
        let mut scene = reference_scene();
        for i in 0..3 {
            scene.update(i as f32, 1.0, &InputSnapshot::new()).unwrap();
        }
        assert_eq!(scene.frame(), 3);
    }
}
