//! Rays, axis-aligned boxes and the matrix helpers shared by picking and
//! rendering.
//!
//! Depth follows glam's `perspective_rh` convention: normalized device depth
//! runs from 0 at the near plane to 1 at the far plane.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in min/max corner form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// Inverted box that any `expand_to_include` call will overwrite.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |aabb, p| aabb.expand_to_include(p))
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn expand_to_include(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing all eight corners after `matrix` is applied.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::from_points(self.corners().map(|c| matrix.transform_point3(c)))
    }
}

/// Half-line with origin and (normalized) direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            dir: Vec3::NEG_Z,
        }
    }
}

impl Ray {
    /// Build a ray; a zero direction is kept as zero and never hits anything.
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Slab test. Returns the distance to the first boundary crossing in
    /// front of the origin; for an origin inside the box that is the exit
    /// distance.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        if self.dir == Vec3::ZERO || aabb.is_empty() {
            return None;
        }
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        for axis in 0..3 {
            let (origin, dir) = (self.origin[axis], self.dir[axis]);
            let (min, max) = (aabb.min[axis], aabb.max[axis]);
            if dir == 0.0 {
                // Parallel to this slab: no constraint unless outside it.
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }
            let t1 = (min - origin) / dir;
            let t2 = (max - origin) / dir;
            tmin = tmin.max(t1.min(t2));
            tmax = tmax.min(t1.max(t2));
        }

        if tmax < 0.0 || tmin > tmax {
            None
        } else if tmin < 0.0 {
            Some(tmax)
        } else {
            Some(tmin)
        }
    }
}

/// Translation, rotation about +Y by `yaw` radians, then scale.
pub fn trs_y(translation: Vec3, yaw: f32, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, Quat::from_rotation_y(yaw), translation)
}

/// Maps normalized device coordinates to window pixels (origin bottom-left)
/// and depth `[0, 1]` to `[near, far]`.
pub fn viewport_matrix(x: f32, y: f32, width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x + width * 0.5, y + height * 0.5, near))
        * Mat4::from_scale(Vec3::new(width * 0.5, height * 0.5, far - near))
}

/// World-space ray through a window pixel (origin bottom-left), built by
/// unprojecting the pixel at the near and far planes.
pub fn world_ray_from_window_coords(
    window: Vec2,
    view: &Mat4,
    projection: &Mat4,
    viewport: &Mat4,
) -> Ray {
    let inverse = (*viewport * *projection * *view).inverse();
    let near = inverse.project_point3(window.extend(0.0));
    let far = inverse.project_point3(window.extend(1.0));
    Ray::new(near, far - near)
}

/// Window coordinates (origin bottom-left) of a world point, given the
/// combined viewport * projection * view matrix. `None` when the point lies
/// behind the eye.
pub fn window_coords_from_world(world: Vec3, viewport_projection_view: &Mat4) -> Option<Vec2> {
    let clip = *viewport_projection_view * world.extend(1.0);
    if clip.w <= 0.0 {
        return None;
    }
    Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray.at(t).abs_diff_eq(Vec3::new(0.0, 0.0, 1.0), 1e-5));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn ray_beside_box_misses() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn ray_from_inside_hits_at_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn ray_on_face_parallel_to_it_hits() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::Z);
        assert!(aabb.contains_point(ray.origin));
        let t = ray.intersect_aabb(&aabb).unwrap();
        assert!((t - 1.0).abs() < 1e-5);

        let outside = Ray::new(Vec3::new(-1.5, 0.0, 0.0), Vec3::Z);
        assert!(outside.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn ray_grazing_face_from_outside_hits() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = ray.intersect_aabb(&unit_box()).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn zero_direction_never_hits() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(ray.intersect_aabb(&unit_box()).is_none());
    }

    #[test]
    fn aabb_transform_translates_and_scales() {
        let m = trs_y(Vec3::new(10.0, 0.0, 0.0), 0.0, Vec3::splat(2.0));
        let out = unit_box().transform(&m);
        assert!(out.min.abs_diff_eq(Vec3::new(8.0, -2.0, -2.0), 1e-5));
        assert!(out.max.abs_diff_eq(Vec3::new(12.0, 2.0, 2.0), 1e-5));
    }

    #[test]
    fn aabb_transform_encloses_rotated_corners() {
        let m = trs_y(Vec3::ZERO, std::f32::consts::FRAC_PI_4, Vec3::ONE);
        let out = unit_box().transform(&m);
        let r = std::f32::consts::SQRT_2;
        assert!((out.max.x - r).abs() < 1e-5);
        assert!((out.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_box_stays_empty() {
        assert!(Aabb::EMPTY.is_empty());
        assert!(Aabb::EMPTY.transform(&Mat4::IDENTITY).is_empty());
        assert!(!unit_box().is_empty());
        assert!(unit_box().contains_point(Vec3::ZERO));
    }

    #[test]
    fn viewport_maps_ndc_corners_to_pixels() {
        let vp = viewport_matrix(0.0, 0.0, 800.0, 600.0, 0.0, 1.0);
        let center = vp.transform_point3(Vec3::ZERO);
        assert!(center.abs_diff_eq(Vec3::new(400.0, 300.0, 0.0), 1e-4));
        let corner = vp.transform_point3(Vec3::new(1.0, 1.0, 1.0));
        assert!(corner.abs_diff_eq(Vec3::new(800.0, 600.0, 1.0), 1e-4));
    }

    fn frame() -> (Mat4, Mat4, Mat4) {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 1.0, 500.0);
        let viewport = viewport_matrix(0.0, 0.0, 800.0, 800.0, 0.0, 1.0);
        (view, projection, viewport)
    }

    #[test]
    fn center_pixel_unprojects_along_view_axis() {
        let (view, projection, viewport) = frame();
        let ray =
            world_ray_from_window_coords(Vec2::new(400.0, 400.0), &view, &projection, &viewport);
        assert!(ray.origin.abs_diff_eq(Vec3::new(0.0, 0.0, 9.0), 1e-3));
        assert!(ray.dir.abs_diff_eq(Vec3::NEG_Z, 1e-4));
    }

    #[test]
    fn world_point_projects_back_to_pixel() {
        let (view, projection, viewport) = frame();
        let vpv = viewport * projection * view;
        let px = window_coords_from_world(Vec3::ZERO, &vpv).unwrap();
        assert!(px.abs_diff_eq(Vec2::new(400.0, 400.0), 1e-3));
        assert!(window_coords_from_world(Vec3::new(0.0, 0.0, 20.0), &vpv).is_none());
    }
}
