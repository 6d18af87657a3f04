use glam::Vec3;
use scenekit_common::EntityId;
use scenekit_ecs::{
    AnimationState, JoinExt, Locomotion, MeshRef, NpcController, Transform, Velocity,
};
use scenekit_kernel::Scene;

/// Read-only queries against a scene for debugging and development UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        SceneSummary {
            frame: scene.frame(),
            entity_count: scene.store.entity_count(),
            pending_events: scene.store.events().len(),
            draw_calls: scene.draw_calls,
            camera_position: scene.camera.position(),
            player_state: player_locomotion(scene),
            state_hash: scene.state_hash(),
        }
    }

    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        if !scene.store.is_alive(id) {
            return None;
        }
        let transform = scene.store.get::<Transform>(id).copied().unwrap_or_default();
        Some(EntityInfo {
            id,
            position: transform.position,
            yaw: transform.rotation.y,
            scale: transform.scale,
            velocity: scene.store.get::<Velocity>(id).map(|v| v.0),
            mesh: scene
                .store
                .get::<MeshRef>(id)
                .and_then(|m| scene.meshes.get(m.0).ok())
                .map(|mesh| mesh.name().to_string()),
            locomotion: scene.store.get::<AnimationState>(id).map(AnimationState::state),
            waypoint: scene
                .store
                .get::<NpcController>(id)
                .map(|npc| npc.current_waypoint),
        })
    }

    pub fn list_entities(scene: &Scene) -> Vec<EntityId> {
        scene.store.entities().collect()
    }
}

/// Locomotion state of the first player-controlled animated entity.
pub fn player_locomotion(scene: &Scene) -> Option<Locomotion> {
    let tables = scene.store.tables();
    tables
        .players
        .iter()
        .join(tables.animations.iter())
        .next()
        .map(|(_, (_, anim))| anim.state())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub frame: u64,
    pub entity_count: usize,
    pub pending_events: usize,
    pub draw_calls: usize,
    pub camera_position: Vec3,
    pub player_state: Option<Locomotion>,
    pub state_hash: u64,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = self.camera_position;
        write!(
            f,
            "Scene: frame={} entities={} pending_events={} draw_calls={} ",
            self.frame, self.entity_count, self.pending_events, self.draw_calls
        )?;
        write!(
            f,
            "camera=({:.2}, {:.2}, {:.2}) player={} hash={:016x}",
            c.x,
            c.y,
            c.z,
            self.player_state.map_or("none", Locomotion::label),
            self.state_hash
        )
    }
}

/// Components of a single entity, flattened for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: Vec3,
    pub yaw: f32,
    pub scale: Vec3,
    pub velocity: Option<Vec3>,
    pub mesh: Option<String>,
    pub locomotion: Option<Locomotion>,
    pub waypoint: Option<usize>,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.position;
        write!(
            f,
            "Entity [{}] pos=({:.2}, {:.2}, {:.2}) scale={:.3}",
            self.id, p.x, p.y, p.z, self.scale.x
        )?;
        if let Some(v) = self.velocity {
            write!(f, " vel=({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)?;
        }
        if let Some(mesh) = &self.mesh {
            write!(f, " mesh={mesh}")?;
        }
        if let Some(state) = self.locomotion {
            write!(f, " state={}", state.label())?;
        }
        if let Some(waypoint) = self.waypoint {
            write!(f, " waypoint={waypoint}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenekit_assets::MeshTable;
    use scenekit_input::{InputSnapshot, Key};
    use scenekit_kernel::{SceneConfig, SceneMeshes};

    fn scene() -> Scene {
        let mut meshes = MeshTable::new();
        let slots = SceneMeshes::register_placeholders(&mut meshes).unwrap();
        Scene::reference(SceneConfig::default(), meshes, slots).unwrap()
    }

    #[test]
    fn summary_of_fresh_scene() {
        let scene = scene();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.frame, 0);
        assert_eq!(summary.entity_count, 3);
        assert!(summary.pending_events > 0);
        assert_eq!(summary.player_state, Some(Locomotion::Idle));
    }

    #[test]
    fn summary_tracks_player_state() {
        let mut scene = scene();
        scene.update(0.0, 0.1, &InputSnapshot::with_keys([Key::W])).unwrap();
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.frame, 1);
        assert_eq!(summary.player_state, Some(Locomotion::Walking));
        assert!(summary.to_string().contains("player=Walking"));
    }

    #[test]
    fn inspect_npc() {
        let scene = scene();
        let npc = SceneInspector::list_entities(&scene)[0];
        let info = SceneInspector::inspect_entity(&scene, npc).unwrap();
        assert_eq!(info.position, Vec3::new(10.0, 0.0, 10.0));
        assert_eq!(info.mesh.as_deref(), Some("fox"));
        assert_eq!(info.waypoint, Some(0));
        assert_eq!(info.locomotion, None);
        assert!(info.to_string().contains("waypoint=0"));
    }

    #[test]
    fn inspect_destroyed_entity() {
        let mut scene = scene();
        let id = SceneInspector::list_entities(&scene)[2];
        scene.despawn(id).unwrap();
        assert!(SceneInspector::inspect_entity(&scene, id).is_none());
        assert_eq!(SceneInspector::list_entities(&scene).len(), 2);
    }
}
