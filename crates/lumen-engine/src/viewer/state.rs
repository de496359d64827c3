use crate::camera::PerspectiveCamera;
use crate::coords::ViewportState;
use crate::error::ViewerError;
use crate::render::{FrameStats, Renderer};
use crate::scene::Scene;

/// Everything a tick callback may touch.
///
/// The viewport is read-only from outside; it only changes through the resize
/// cascade so camera and renderer never drift from it.
pub struct ViewerState<R> {
    pub(super) viewport: ViewportState,
    pub(super) camera: PerspectiveCamera,
    pub(super) scene: Scene,
    pub(super) renderer: R,
}

impl<R: Renderer> ViewerState<R> {
    #[inline]
    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Scene and camera borrowed together, for setup code that edits both.
    #[inline]
    pub fn scene_and_camera_mut(&mut self) -> (&mut Scene, &mut PerspectiveCamera) {
        (&mut self.scene, &mut self.camera)
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Draws the current scene through the camera.
    pub fn render(&mut self) -> Result<FrameStats, ViewerError> {
        self.renderer.draw_frame(&self.scene, &mut self.camera)
    }
}
