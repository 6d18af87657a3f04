//! Scene kernel: per-frame simulation of the scene and the state the render
//! orchestrator reads back.
//!
//! # Invariants
//! - Systems run once per frame in a fixed order; see [`Scene::update`].
//! - Camera pitch stays within `[-89°, 0°]`.
//! - Instance bounds are refreshed in the same frame, before picking reads
//!   them.
//! - Picking only reports; it never changes the scene.

pub mod animation;
pub mod camera;
pub mod config;
pub mod frame;
pub mod instances;
pub mod movement;
pub mod npc;
pub mod picking;
pub mod player;
pub mod scene;

pub use animation::{AnimationSettings, animation_system, locomotion_clip};
pub use camera::OrbitCamera;
pub use config::{ConfigError, SceneConfig};
pub use frame::FrameMatrices;
pub use instances::{InstanceSlot, PointLight, SceneInstance, SceneInstances, SceneMeshes};
pub use movement::movement_system;
pub use npc::npc_waypoint_system;
pub use picking::{PickReport, picking_system};
pub use player::{PlayerRig, player_control_system};
pub use scene::{Scene, SceneError, SceneSettings};

pub fn crate_info() -> &'static str {
    "scenekit-kernel v0.1.0"
}
