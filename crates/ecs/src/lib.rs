//! Entity store for the scene: one typed table per component, keyed by
//! generational entity ids.
//!
//! # Invariants
//! - Tables iterate in `EntityId` order, so views are deterministic.
//! - A view yields exactly the entities present in every joined table.
//! - Structural changes (create, destroy, attach, detach) produce events.

pub mod components;
pub mod join;
pub mod store;
pub mod table;

pub use components::{
    AnimationState, BLEND_DURATION, Locomotion, MeshRef, NpcBehavior, NpcController,
    PlayerController, Transform, Velocity,
};
pub use join::{Join, JoinExt};
pub use store::{Component, ComponentKind, EntityStore, StoreError, StoreEvent, Tables};
pub use table::ComponentTable;

pub fn crate_info() -> &'static str {
    "scenekit-ecs v0.1.0"
}
