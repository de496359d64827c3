use winit::event::WindowEvent;

use crate::camera::PerspectiveCamera;
use crate::scene::Scene;
use crate::time::FrameTime;

/// Control directive returned by per-tick callbacks and event hooks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    /// Finish the current tick, then stop the loop.
    Stop,
}

/// Application contract implemented by programs hosted by the window runtime.
pub trait App: 'static {
    /// Called once after the viewer is built, before the first tick.
    fn setup(&mut self, scene: &mut Scene, camera: &mut PerspectiveCamera) {
        let _ = (scene, camera);
    }

    /// Called for window events the runtime does not consume itself (input,
    /// focus, cursor). Resize, scale-factor, close and redraw never get here.
    ///
    /// Input handlers such as orbit controls record what they need here and
    /// apply it to the camera in [`App::update`].
    fn on_window_event(&mut self, event: &WindowEvent) -> LoopControl {
        let _ = event;
        LoopControl::Continue
    }

    /// Advances animation state. Called once per tick, before the frame is drawn.
    fn update(
        &mut self,
        scene: &mut Scene,
        camera: &mut PerspectiveCamera,
        time: FrameTime,
    ) -> LoopControl;
}
