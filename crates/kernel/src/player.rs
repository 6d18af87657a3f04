use glam::{Quat, Vec3};
use scenekit_common::Ray;
use scenekit_ecs::{JoinExt, Tables, Velocity};
use scenekit_input::{InputSnapshot, Key};

/// Height above the player's feet the view ray starts from.
pub const VIEW_RAY_HEIGHT: f32 = 2.0;

/// Per-player rig state derived each frame: camera-relative basis, the
/// forward view ray and the result of the last view-ray test.
#[derive(Debug, Clone)]
pub struct PlayerRig {
    pub position: Vec3,
    pub max_speed: f32,
    pub forward: Vec3,
    pub right: Vec3,
    pub view_ray: Ray,
    /// Contact point of the last successful view-ray test this frame.
    pub view_ray_hit: Option<Vec3>,
    gizmo_key_down: bool,
}

impl PlayerRig {
    pub fn new(position: Vec3, max_speed: f32) -> Self {
        let mut rig = Self {
            position,
            max_speed,
            forward: Vec3::NEG_Z,
            right: Vec3::X,
            view_ray: Ray::default(),
            view_ray_hit: None,
            gizmo_key_down: false,
        };
        rig.refresh_view_ray();
        rig
    }

    /// Move the rig and re-aim its view ray from the new position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.refresh_view_ray();
    }

    /// Feed the gizmo key state; true only on the frame it goes down.
    pub fn gizmo_key_pressed(&mut self, down: bool) -> bool {
        let rising = down && !self.gizmo_key_down;
        self.gizmo_key_down = down;
        rising
    }

    fn refresh_view_ray(&mut self) {
        self.view_ray = Ray::new(self.position + Vec3::Y * VIEW_RAY_HEIGHT, self.forward);
    }
}

/// Camera-relative forward and right vectors on the ground plane.
pub fn camera_basis(yaw: f32) -> (Vec3, Vec3) {
    let forward = Quat::from_rotation_y(yaw) * Vec3::NEG_Z;
    let right = forward.cross(Vec3::Y);
    (forward, right)
}

/// Unit movement direction from the directional keys, or zero when the keys
/// cancel out or none are held.
pub fn control_direction(input: &InputSnapshot, forward: Vec3, right: Vec3) -> Vec3 {
    let axis = |positive: Key, negative: Key| {
        input.is_key_pressed(positive) as i32 as f32 - input.is_key_pressed(negative) as i32 as f32
    };
    (forward * axis(Key::W, Key::S) + right * axis(Key::D, Key::A)).normalize_or_zero()
}

/// Turn key state into the velocity of every player-controlled entity.
pub fn player_control_system(
    tables: &mut Tables,
    rig: &mut PlayerRig,
    yaw: f32,
    input: &InputSnapshot,
) -> Vec3 {
    let _span = tracing::info_span!("player_control").entered();

    let (forward, right) = camera_basis(yaw);
    rig.forward = forward;
    rig.right = right;
    rig.refresh_view_ray();

    let direction = control_direction(input, forward, right);
    if direction != Vec3::ZERO {
        let keys: Vec<Key> = input.pressed_keys().collect();
        tracing::debug!(?keys, ?direction, "player input");
    }

    let velocity = direction * rig.max_speed;
    for (_, (controller, vel)) in tables.players.iter_mut().join(tables.velocities.iter_mut()) {
        controller.direction = direction;
        *vel = Velocity(velocity);
    }
    direction
}
