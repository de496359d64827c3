use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::ViewportState;
use crate::core::{App, LoopControl, TickOutcome};
use crate::device::{Gpu, GpuInit};
use crate::render::MeshRenderer;
use crate::time::FrameClock;
use crate::viewer::{ResizeBus, ResizeEvent, Viewer, ViewerConfig};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and runs `app` in it until the window closes or the
    /// frame loop stops.
    ///
    /// A fatal frame error (lost surface) ends the run and is returned.
    pub fn run<A>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        viewer_config: ViewerConfig,
        app: A,
    ) -> Result<()>
    where
        A: App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, viewer_config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct WindowEntry {
    window: Arc<Window>,
    viewer: Viewer<MeshRenderer>,
}

struct AppState<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    viewer_config: ViewerConfig,

    /// Shared between the frame-loop callback and window-event forwarding.
    app: Rc<RefCell<A>>,

    bus: ResizeBus,
    entry: Option<WindowEntry>,
    exit_requested: bool,
    /// Last reported size was 0x0; no redraws are requested until it grows.
    minimized: bool,
    failure: Option<anyhow::Error>,
}

impl<A: App> AppState<A> {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, viewer_config: ViewerConfig, app: A) -> Self {
        Self {
            config,
            gpu_init,
            viewer_config,
            app: Rc::new(RefCell::new(app)),
            bus: ResizeBus::new(),
            entry: None,
            exit_requested: false,
            minimized: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.destroy_window_entry();
        self.request_exit(event_loop);
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(window.clone(), self.gpu_init.clone()))
            .context("GPU initialization failed for window")?;

        let size = window.inner_size();
        let viewport = ViewportState::new(size.width, size.height, window.scale_factor() as f32)
            .context("initial window size")?;

        let mut viewer = Viewer::new(
            &self.viewer_config,
            viewport,
            MeshRenderer::new(gpu),
            Box::new(FrameClock::new()),
            &mut self.bus,
        )
        .context("failed to build viewer")?;

        {
            let (scene, camera) = viewer.state_mut().scene_and_camera_mut();
            self.app.borrow_mut().setup(scene, camera);
        }
        viewer.start_app(self.app.clone());

        window.request_redraw();
        self.entry = Some(WindowEntry { window, viewer });
        Ok(())
    }

    fn destroy_window_entry(&mut self) {
        if let Some(entry) = self.entry.take() {
            // Dropping the renderer releases the surface and GPU buffers.
            drop(entry.viewer.teardown(&mut self.bus));
        }
    }

    /// Publishes the window's current drawable size and applies it right away.
    fn publish_resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.bus.publish(ResizeEvent::new(width, height, scale_factor as f32));
        self.minimized = !is_drawable(width, height);

        let Some(entry) = self.entry.as_mut() else { return };
        if let Err(err) = entry.viewer.pump_resize_events() {
            // Minimized windows report 0x0; keep the last good size.
            log::debug!("resize ignored: {err}");
        }
        if !self.minimized {
            entry.window.request_redraw();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(entry) = self.entry.as_mut() else { return };

        match entry.viewer.tick() {
            Ok(TickOutcome::Ran(_)) => {}
            Ok(TickOutcome::Finished(time)) => {
                log::info!("frame loop finished after {} frames", time.frame_index + 1);
                self.destroy_window_entry();
                self.request_exit(event_loop);
            }
            Ok(TickOutcome::Idle) => {
                self.destroy_window_entry();
                self.request_exit(event_loop);
            }
            Err(err) => {
                let err = anyhow::Error::new(err).context("frame loop stopped");
                self.fail(event_loop, err);
            }
        }
    }
}

impl<A: App> ApplicationHandler for AppState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; FIFO presentation paces it to the display. A
        // minimized surface presents nothing, so it would spin unpaced.
        if self.minimized {
            return;
        }
        if let Some(entry) = self.entry.as_ref() {
            entry.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = self.entry.as_ref() else { return };
        if entry.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.destroy_window_entry();
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                let scale = entry.window.scale_factor();
                self.publish_resize(new_size.width, new_size.height, scale);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = entry.window.inner_size();
                self.publish_resize(size.width, size.height, scale_factor);
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            other => {
                if self.app.borrow_mut().on_window_event(&other) == LoopControl::Stop {
                    log::info!("app requested exit");
                    self.destroy_window_entry();
                    self.request_exit(event_loop);
                }
            }
        }
    }
}

/// Whether a reported window size can be presented to.
fn is_drawable(width: u32, height: u32) -> bool {
    width > 0 && height > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimized_sizes_are_not_drawable() {
        assert!(!is_drawable(0, 0));
        assert!(!is_drawable(0, 720));
        assert!(!is_drawable(1280, 0));
        assert!(is_drawable(1, 1));
        assert!(is_drawable(1280, 720));
    }
}
