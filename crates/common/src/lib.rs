//! Shared types for the scenekit frame core: entity identity, transforms,
//! mesh handles, and the geometric primitives (rays, bounding boxes, frame
//! matrix helpers) every system works with.

pub mod geometry;
pub mod types;

pub use geometry::{
    Aabb, Ray, trs_y, viewport_matrix, window_coords_from_world, world_ray_from_window_coords,
};
pub use types::{EntityId, MeshHandle, Transform};

pub fn crate_info() -> &'static str {
    "scenekit-common v0.1.0"
}
