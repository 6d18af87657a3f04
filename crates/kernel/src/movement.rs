use glam::Vec3;
use scenekit_common::EntityId;
use scenekit_ecs::{JoinExt, Tables};

/// Integrate velocity into position for every entity that has both.
pub fn movement_system(tables: &mut Tables, dt: f32) {
    let _span = tracing::info_span!("movement").entered();
    for (_, (transform, velocity)) in tables.transforms.iter_mut().join(tables.velocities.iter()) {
        transform.position += velocity.0 * dt;
    }
}

/// Position of the first player-controlled entity with a transform.
///
/// Single-player scene: further matches are ignored.
pub fn player_anchor(tables: &Tables) -> Option<(EntityId, Vec3)> {
    tables
        .players
        .iter()
        .join(tables.transforms.iter())
        .next()
        .map(|(id, (_, transform))| (id, transform.position))
}
