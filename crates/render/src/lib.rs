//! Rendering adapter: the interfaces the frame core draws through, headless
//! recording back ends, and the per-frame orchestrator.
//!
//! # Invariants
//! - Frame matrices are recomputed before the pass begins.
//! - Instance bounds are refreshed before debug shapes read them.
//! - Every pushed shape state is popped, including on early return.
//!
//! GPU back ends implement [`MeshRenderer`] and [`ShapeRenderer`] outside
//! this workspace; consumers depend only on the traits.

mod orchestrator;
mod renderer;
mod shapes;

pub use orchestrator::{
    AABB_COLOR, FrameReport, GIZMO_AXIS_LENGTH, GIZMO_SLOT, RenderError, VIEW_RAY_LENGTH,
    render_frame,
};
pub use renderer::{MeshRenderer, PassUniforms, RecordingMeshRenderer, Submission};
pub use shapes::{Color4u, LineSegment, ShapeBatch, ShapeRenderer, ShapeRendererExt, StateScope};

pub fn crate_info() -> &'static str {
    "scenekit-render v0.1.0"
}
