use glam::{IVec2, Quat, Vec3};
use scenekit_input::MouseState;

use crate::config::CameraConfig;

/// Lowest allowed pitch (looking down), radians.
pub const PITCH_MIN: f32 = -89.0 * std::f32::consts::PI / 180.0;
/// Highest allowed pitch (level), radians.
pub const PITCH_MAX: f32 = 0.0;

/// Third-person camera orbiting a look-at point.
///
/// Yaw and pitch are private so pitch always stays in
/// `[PITCH_MIN, PITCH_MAX]`.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub look_at: Vec3,
    pub up: Vec3,
    pub distance: f32,
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,
    yaw: f32,
    pitch: f32,
    position: Vec3,
    mouse_prev: Option<IVec2>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self {
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            distance: config.distance,
            sensitivity: config.sensitivity,
            near: config.near,
            far: config.far,
            yaw: 0.0,
            pitch: 0.0,
            position: Vec3::ZERO,
            mouse_prev: None,
        };
        camera.set_orientation(config.yaw, config.pitch);
        camera
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Most recent mouse sample, `None` before the first frame.
    pub fn mouse_prev(&self) -> Option<IVec2> {
        self.mouse_prev
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(PITCH_MIN, PITCH_MAX);
        self.refresh_position();
    }

    /// Retarget the orbit and move the eye with it.
    pub fn set_look_at(&mut self, look_at: Vec3) {
        self.look_at = look_at;
        self.refresh_position();
    }

    /// Apply one frame of mouse input.
    ///
    /// Dragging with the left button rotates the orbit by the pixel delta
    /// since the previous sample. The first sample after a press has no
    /// previous sample to diff against and so never snaps the view. The
    /// sample is stored whether or not the button is held.
    pub fn update(&mut self, mouse: &MouseState) {
        let _span = tracing::info_span!("camera_update").entered();

        let delta = match self.mouse_prev {
            Some(prev) if mouse.left => prev - mouse.position,
            _ => IVec2::ZERO,
        };
        self.mouse_prev = Some(mouse.position);

        if delta != IVec2::ZERO {
            tracing::trace!(dx = delta.x, dy = delta.y, "orbit drag");
        }
        self.set_orientation(
            self.yaw + delta.x as f32 * self.sensitivity,
            self.pitch + delta.y as f32 * self.sensitivity,
        );
    }

    fn refresh_position(&mut self) {
        let orbit = Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch);
        self.position = self.look_at + orbit * Vec3::new(0.0, 0.0, self.distance);
    }
}
