use scenekit_ecs::{JoinExt, Tables, Velocity};

/// Distance under which an NPC counts as having reached its waypoint.
pub const ARRIVAL_THRESHOLD: f32 = 0.5;

/// Steer every NPC toward its current waypoint.
///
/// On arrival the route advances and the velocity is left untouched for
/// that frame, so the NPC coasts one tick on its previous heading.
pub fn npc_waypoint_system(tables: &mut Tables) {
    let _span = tracing::info_span!("npc_waypoints").entered();

    let view = tables
        .npcs
        .iter_mut()
        .join(tables.transforms.iter())
        .join(tables.velocities.iter_mut());
    for (id, ((npc, transform), velocity)) in view {
        let Some(target) = npc.target() else {
            continue;
        };
        let to_target = target - transform.position;
        if to_target.length() < ARRIVAL_THRESHOLD {
            npc.advance();
            tracing::debug!(%id, waypoint = npc.current_waypoint, "npc reached waypoint");
            continue;
        }
        *velocity = Velocity(to_target.normalize() * npc.speed);
    }
}
