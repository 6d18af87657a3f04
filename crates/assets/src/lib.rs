//! Mesh and animation assets as the frame core sees them.
//!
//! Import and GPU upload live outside this workspace. The core consumes
//! meshes through [`AnimatedMesh`] and addresses them by [`MeshHandle`]
//! through a shared [`MeshTable`].

mod mesh;
mod placeholder;
mod table;

pub use mesh::{AnimatedMesh, AnimationPose, ClipSelection};
pub use placeholder::PlaceholderMesh;
pub use scenekit_common::MeshHandle;
pub use table::{AssetError, MeshTable};

pub fn crate_info() -> &'static str {
    "scenekit-assets v0.1.0"
}
