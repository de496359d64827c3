//! Rendering subsystem.
//!
//! A `Renderer` turns the current `Scene` seen through a `PerspectiveCamera`
//! into one frame on its output. Each renderer owns its own resources
//! (pipelines, buffers, depth target) and releases them on drop.
//!
//! Convention:
//! - right-handed world space, +Y up, camera looks down -Z
//! - colors are linear; the surface format handles sRGB encoding

mod ctx;
mod gpu_types;
mod headless;
mod mesh;
mod plan;

pub use headless::HeadlessRenderer;
pub use mesh::MeshRenderer;
pub use plan::{DrawItem, FramePlan, Lighting, PlanDiagnostics, MAX_DIRECTIONAL_LIGHTS};

use crate::camera::PerspectiveCamera;
use crate::coords::ViewportState;
use crate::error::ViewerError;
use crate::scene::Scene;

/// Output side of the viewer.
pub trait Renderer {
    /// Sizes the output to the viewport's drawable size.
    ///
    /// Called once at startup and again for every accepted resize.
    fn configure(&mut self, viewport: &ViewportState) -> Result<(), ViewerError>;

    /// Draws one frame of `scene` from `camera`.
    ///
    /// Takes the camera mutably so a stale projection can be recomputed.
    /// Nodes with unsupported materials are skipped, not fatal.
    fn draw_frame(
        &mut self,
        scene: &Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<FrameStats, ViewerError>;

    /// Current output size in physical pixels, if configured.
    fn output_size(&self) -> Option<(u32, u32)>;
}

/// What one `draw_frame` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes_drawn: usize,
    pub nodes_skipped: usize,
    pub lights: usize,
    /// `false` when the frame was dropped (e.g. outdated surface).
    pub presented: bool,
}

impl FrameStats {
    pub(crate) fn from_plan(plan: &FramePlan, presented: bool) -> Self {
        Self {
            nodes_drawn: plan.items.len(),
            nodes_skipped: plan.skipped.len(),
            lights: plan.light_count,
            presented,
        }
    }
}
