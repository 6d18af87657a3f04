//! Developer tooling: scene inspector and the model behind the settings
//! panels.
//!
//! # Invariants
//! - The inspector never mutates the scene.
//! - Panel writes touch only the fields a panel exposes.

pub mod inspector;
pub mod panels;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
pub use panels::GameInfo;

pub fn crate_info() -> &'static str {
    "scenekit-tools v0.1.0"
}
