use crate::camera::PerspectiveCamera;
use crate::coords::ViewportState;
use crate::error::ViewerError;
use crate::scene::Scene;

use super::plan::{FramePlan, PlanDiagnostics};
use super::{FrameStats, Renderer};

/// Renderer without a GPU.
///
/// Runs the full CPU side of a frame (lighting, transforms, material checks)
/// and counts frames instead of rasterizing. Useful for deterministic tests,
/// off-screen runs, and as the reference for what a backend must do per frame.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    viewport: Option<ViewportState>,
    configure_count: u32,
    frames_drawn: u64,
    surface_lost: bool,
    plan: FramePlan,
    diagnostics: PlanDiagnostics,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// How many times `configure` reallocated the output.
    #[inline]
    pub fn configure_count(&self) -> u32 {
        self.configure_count
    }

    #[inline]
    pub fn viewport(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    /// The plan built by the most recent `draw_frame`.
    #[inline]
    pub fn last_plan(&self) -> &FramePlan {
        &self.plan
    }

    /// Simulates permanent loss of the output surface; every later draw fails.
    pub fn lose_surface(&mut self) {
        self.surface_lost = true;
    }
}

impl Renderer for HeadlessRenderer {
    fn configure(&mut self, viewport: &ViewportState) -> Result<(), ViewerError> {
        self.viewport = Some(*viewport);
        self.configure_count += 1;
        log::debug!(
            "headless output configured to {}x{} @ {}",
            viewport.width(),
            viewport.height(),
            viewport.pixel_ratio()
        );
        Ok(())
    }

    fn draw_frame(
        &mut self,
        scene: &Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<FrameStats, ViewerError> {
        if self.surface_lost {
            return Err(ViewerError::surface("headless surface lost"));
        }
        if self.viewport.is_none() {
            return Err(ViewerError::surface("renderer not configured"));
        }

        self.plan.rebuild(scene, camera);
        self.diagnostics.report(&self.plan);
        self.frames_drawn += 1;

        Ok(FrameStats::from_plan(&self.plan, true))
    }

    fn output_size(&self) -> Option<(u32, u32)> {
        self.viewport.map(|v| v.size())
    }
}
