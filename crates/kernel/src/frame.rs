use glam::{Mat4, UVec2, Vec2};
use scenekit_common::{Ray, viewport_matrix, world_ray_from_window_coords};

use crate::camera::OrbitCamera;

/// Vertical field of view, degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 60.0;

/// Projection, view and viewport for one frame. Derived from the camera and
/// window size every frame and never carried forward as state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub projection: Mat4,
    pub view: Mat4,
    pub viewport: Mat4,
    pub window_size: UVec2,
}

impl Default for FrameMatrices {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            viewport: Mat4::IDENTITY,
            window_size: UVec2::ZERO,
        }
    }
}

impl FrameMatrices {
    pub fn compute(camera: &OrbitCamera, window_size: UVec2) -> Self {
        let size = window_size.as_vec2();
        let aspect = if window_size.x == 0 || window_size.y == 0 {
            1.0
        } else {
            size.x / size.y
        };
        Self {
            projection: Mat4::perspective_rh(
                FIELD_OF_VIEW_DEG.to_radians(),
                aspect,
                camera.near,
                camera.far,
            ),
            view: Mat4::look_at_rh(camera.position(), camera.look_at, camera.up),
            viewport: viewport_matrix(0.0, 0.0, size.x, size.y, 0.0, 1.0),
            window_size,
        }
    }

    pub fn has_area(&self) -> bool {
        self.window_size.x > 0 && self.window_size.y > 0
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn viewport_projection_view(&self) -> Mat4 {
        self.viewport * self.projection * self.view
    }

    /// World ray through a window pixel (origin bottom-left). `None` until a
    /// frame with a non-empty window has been computed.
    pub fn unproject(&self, window: Vec2) -> Option<Ray> {
        self.has_area().then(|| {
            world_ray_from_window_coords(window, &self.view, &self.projection, &self.viewport)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;
    use glam::Vec3;
    use scenekit_common::window_coords_from_world;

    fn level_camera() -> OrbitCamera {
        OrbitCamera::from_config(&CameraConfig {
            pitch: 0.0,
            ..CameraConfig::default()
        })
    }

    #[test]
    fn centre_pixel_ray_hits_look_at() {
        let camera = level_camera();
        let matrices = FrameMatrices::compute(&camera, UVec2::new(800, 600));
        let ray = matrices.unproject(Vec2::new(400.0, 300.0)).unwrap();
        assert!(ray.dir.abs_diff_eq(Vec3::NEG_Z, 1e-4));
        assert!((ray.origin.z - 14.0).abs() < 1e-3);
    }

    #[test]
    fn look_at_projects_to_window_centre() {
        let camera = level_camera();
        let matrices = FrameMatrices::compute(&camera, UVec2::new(800, 600));
        let pixel = window_coords_from_world(camera.look_at, &matrices.viewport_projection_view())
            .unwrap();
        assert!(pixel.abs_diff_eq(Vec2::new(400.0, 300.0), 1e-2));
    }

    #[test]
    fn empty_window_has_no_mouse_ray() {
        let matrices = FrameMatrices::compute(&level_camera(), UVec2::ZERO);
        assert!(!matrices.has_area());
        assert!(matrices.unproject(Vec2::ZERO).is_none());
        assert!(FrameMatrices::default().unproject(Vec2::ZERO).is_none());
    }
}
