//! Viewer root.
//!
//! Owns the scene, camera, viewport and renderer, the frame loop that drives
//! them, and the resize subscription that keeps them sized to the host.

mod config;
mod resize;
mod state;

pub use config::ViewerConfig;
pub use resize::{apply_resize, ResizeBus, ResizeEvent, ResizeSubscription, SubscriptionId};
pub use state::ViewerState;

use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::PerspectiveCamera;
use crate::coords::ViewportState;
use crate::core::{App, FrameLoop, LoopControl, TickOutcome};
use crate::error::ViewerError;
use crate::render::Renderer;
use crate::scene::Scene;
use crate::time::{FrameTime, TickSource};

pub struct Viewer<R: Renderer + 'static> {
    state: ViewerState<R>,
    frame_loop: FrameLoop<ViewerState<R>>,
    subscription: Option<ResizeSubscription>,
}

impl<R: Renderer + 'static> Viewer<R> {
    /// Builds the camera and scene from `config`, sizes everything to
    /// `viewport` and subscribes to `bus`. The loop starts stopped.
    pub fn new(
        config: &ViewerConfig,
        viewport: ViewportState,
        renderer: R,
        tick_source: Box<dyn TickSource>,
        bus: &mut ResizeBus,
    ) -> Result<Self, ViewerError> {
        let mut camera = PerspectiveCamera::new(config.fov_degrees, config.near, config.far)?;
        camera.position = config.camera_position;
        camera.set_aspect_ratio(viewport.width(), viewport.height())?;

        let mut renderer = renderer;
        renderer.configure(&viewport)?;

        Ok(Self {
            state: ViewerState {
                viewport,
                camera,
                scene: Scene::new(config.background),
                renderer,
            },
            frame_loop: FrameLoop::new(tick_source),
            subscription: Some(bus.subscribe()),
        })
    }

    pub fn start<F>(&mut self, callback: F)
    where
        F: FnMut(&mut ViewerState<R>, FrameTime) -> Result<LoopControl, ViewerError> + 'static,
    {
        self.frame_loop.start(callback);
    }

    /// Starts the loop with [`animate`]: `update` on the scene and camera,
    /// then a draw.
    pub fn start_animation<F>(&mut self, update: F)
    where
        F: FnMut(&mut Scene, &mut PerspectiveCamera, FrameTime) -> LoopControl + 'static,
    {
        self.frame_loop.start(animate::<R, F>(update));
    }

    /// Starts the loop with `app.update` as the per-tick step.
    ///
    /// The app stays shared so the host can keep feeding it window events
    /// between ticks.
    pub fn start_app<A: App>(&mut self, app: Rc<RefCell<A>>) {
        self.start_animation(move |scene, camera, time| {
            app.borrow_mut().update(scene, camera, time)
        });
    }

    pub fn stop(&mut self) {
        self.frame_loop.stop();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Applies pending resizes, then runs one frame-loop tick.
    pub fn tick(&mut self) -> Result<TickOutcome, ViewerError> {
        if let Err(err) = self.pump_resize_events() {
            log::debug!("resize ignored: {err}");
        }
        self.frame_loop.tick(&mut self.state)
    }

    /// Ticks up to `n` times, returning early once the loop stops.
    /// Returns the number of ticks that ran the callback.
    pub fn run_ticks(&mut self, n: u32) -> Result<u32, ViewerError> {
        let mut ran = 0;
        for _ in 0..n {
            match self.tick()? {
                TickOutcome::Idle => break,
                TickOutcome::Ran(_) => ran += 1,
                TickOutcome::Finished(_) => {
                    ran += 1;
                    break;
                }
            }
        }
        Ok(ran)
    }

    /// Runs the resize cascade immediately.
    pub fn handle_resize(&mut self, event: ResizeEvent) -> Result<(), ViewerError> {
        apply_resize(&mut self.state, event)
    }

    /// Applies the newest event queued on the bus, if any.
    ///
    /// Returns `Ok(true)` when a resize was applied.
    pub fn pump_resize_events(&mut self) -> Result<bool, ViewerError> {
        let Some(event) = self.subscription.as_ref().and_then(ResizeSubscription::latest) else {
            return Ok(false);
        };
        apply_resize(&mut self.state, event)?;
        Ok(true)
    }

    #[inline]
    pub fn state(&self) -> &ViewerState<R> {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut ViewerState<R> {
        &mut self.state
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportState {
        self.state.viewport()
    }

    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        self.state.camera()
    }

    #[inline]
    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        self.state.camera_mut()
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        self.state.scene()
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.state.scene_mut()
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        self.state.renderer()
    }

    /// Stops the loop, leaves the bus and hands back the renderer.
    ///
    /// Dropping the returned renderer releases its output resources.
    pub fn teardown(mut self, bus: &mut ResizeBus) -> R {
        self.frame_loop.stop();
        if let Some(subscription) = self.subscription.take() {
            bus.unsubscribe(subscription);
        }
        log::debug!("viewer torn down after {} ticks", self.frame_loop.ticks_run());
        self.state.renderer
    }
}

/// Tick callback that runs `update` on the scene and camera, then draws the
/// frame.
///
/// The frame is drawn even when `update` asks to stop, so the final state is
/// always presented.
pub fn animate<R, F>(
    mut update: F,
) -> impl FnMut(&mut ViewerState<R>, FrameTime) -> Result<LoopControl, ViewerError> + 'static
where
    R: Renderer + 'static,
    F: FnMut(&mut Scene, &mut PerspectiveCamera, FrameTime) -> LoopControl + 'static,
{
    move |state, time| {
        let (scene, camera) = state.scene_and_camera_mut();
        let control = update(scene, camera, time);
        state.render()?;
        Ok(control)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use winit::event::WindowEvent;

    use super::*;
    use crate::paint::{Color, Material};
    use crate::render::{FrameStats, HeadlessRenderer};
    use crate::scene::{Geometry, LightSource, NodeId, RenderableNode};
    use crate::time::FixedStep;

    /// What the renderer saw at each call.
    #[derive(Debug, Default)]
    struct Log {
        configured: Vec<(u32, u32)>,
        draws: Vec<DrawSeen>,
    }

    #[derive(Debug, Clone, Copy)]
    struct DrawSeen {
        output: Option<(u32, u32)>,
        aspect: f32,
        eye: Vec3,
    }

    struct RecordingRenderer {
        log: Rc<RefCell<Log>>,
        output: Option<(u32, u32)>,
    }

    impl Renderer for RecordingRenderer {
        fn configure(&mut self, viewport: &ViewportState) -> Result<(), ViewerError> {
            self.output = Some(viewport.size());
            self.log.borrow_mut().configured.push(viewport.size());
            Ok(())
        }

        fn draw_frame(
            &mut self,
            _scene: &Scene,
            camera: &mut PerspectiveCamera,
        ) -> Result<FrameStats, ViewerError> {
            self.log.borrow_mut().draws.push(DrawSeen {
                output: self.output,
                aspect: camera.aspect_ratio(),
                eye: camera.position,
            });
            Ok(FrameStats { presented: true, ..FrameStats::default() })
        }

        fn output_size(&self) -> Option<(u32, u32)> {
            self.output
        }
    }

    fn recording_viewer(
        bus: &mut ResizeBus,
        width: u32,
        height: u32,
    ) -> (Viewer<RecordingRenderer>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let renderer = RecordingRenderer { log: log.clone(), output: None };
        let viewer = Viewer::new(
            &ViewerConfig::default(),
            ViewportState::new(width, height, 1.0).unwrap(),
            renderer,
            Box::new(FixedStep::sixty_hz()),
            bus,
        )
        .unwrap();
        (viewer, log)
    }

    fn headless_viewer(bus: &mut ResizeBus) -> Viewer<HeadlessRenderer> {
        Viewer::new(
            &ViewerConfig::default(),
            ViewportState::new(800, 600, 1.0).unwrap(),
            HeadlessRenderer::new(),
            Box::new(FixedStep::sixty_hz()),
            bus,
        )
        .unwrap()
    }

    fn add_cube(scene: &mut Scene) -> NodeId {
        let cube = Arc::new(Geometry::cuboid(1.0, 1.0, 1.0));
        let material = Arc::new(Material::lambert(Color::from_hex(0x0000ff)));
        scene.add_node(RenderableNode::new(cube, material))
    }

    fn y_rotation(scene: &Scene, id: NodeId) -> f32 {
        let v = scene.node(id).unwrap().transform.rotation * Vec3::X;
        (-v.z).atan2(v.x)
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_sizes_camera_and_renderer() {
        let mut bus = ResizeBus::new();
        let (viewer, log) = recording_viewer(&mut bus, 800, 600);

        assert_eq!(viewer.camera().aspect_ratio(), 800.0 / 600.0);
        assert_eq!(viewer.camera().position, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(log.borrow().configured, vec![(800, 600)]);
        assert_eq!(bus.listener_count(), 1);
        assert!(!viewer.is_running());
    }

    #[test]
    fn new_rejects_bad_projection() {
        let mut bus = ResizeBus::new();
        let config = ViewerConfig { near: 0.0, ..ViewerConfig::default() };
        let res = Viewer::new(
            &config,
            ViewportState::new(10, 10, 1.0).unwrap(),
            HeadlessRenderer::new(),
            Box::new(FixedStep::sixty_hz()),
            &mut bus,
        );
        assert!(matches!(res, Err(ViewerError::InvalidProjection { .. })));
        assert_eq!(bus.listener_count(), 0);
    }

    // ── resize cascade ────────────────────────────────────────────────────

    #[test]
    fn resize_reaches_renderer_before_next_draw() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);
        viewer.start(|state, _| {
            state.render()?;
            Ok(LoopControl::Continue)
        });

        viewer.tick().unwrap();
        bus.publish(ResizeEvent::new(400, 300, 1.0));
        viewer.tick().unwrap();

        let log = log.borrow();
        assert_eq!(log.configured, vec![(800, 600), (400, 300)]);
        assert_eq!(log.draws[0].output, Some((800, 600)));
        assert_eq!(log.draws[1].output, Some((400, 300)));
        assert_eq!(log.draws[0].aspect, 800.0 / 600.0);
        assert_eq!(log.draws[1].aspect, 400.0 / 300.0);
    }

    #[test]
    fn pump_applies_in_the_same_turn() {
        let mut bus = ResizeBus::new();
        let (mut viewer, _log) = recording_viewer(&mut bus, 800, 600);

        bus.publish(ResizeEvent::new(1024, 512, 2.0));
        assert!(viewer.pump_resize_events().unwrap());
        assert_eq!(viewer.viewport().size(), (1024, 512));
        assert_eq!(viewer.viewport().pixel_ratio(), 2.0);
        assert_eq!(viewer.camera().aspect_ratio(), 2.0);
        assert!(!viewer.pump_resize_events().unwrap());
    }

    #[test]
    fn zero_size_is_rejected_without_side_effects() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);

        let err = viewer.handle_resize(ResizeEvent::new(0, 600, 1.0)).unwrap_err();
        assert_eq!(err, ViewerError::InvalidViewport { width: 0, height: 600 });
        assert_eq!(viewer.viewport().size(), (800, 600));
        assert_eq!(viewer.camera().aspect_ratio(), 800.0 / 600.0);
        assert_eq!(log.borrow().configured.len(), 1);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);

        for _ in 0..3 {
            viewer.handle_resize(ResizeEvent::new(400, 300, 1.0)).unwrap();
        }
        assert_eq!(viewer.viewport().size(), (400, 300));
        assert_eq!(log.borrow().configured, vec![(800, 600), (400, 300)]);
    }

    #[test]
    fn minimized_window_does_not_stop_the_loop() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);
        viewer.start(|state, _| {
            state.render()?;
            Ok(LoopControl::Continue)
        });

        bus.publish(ResizeEvent::new(0, 0, 1.0));
        assert!(matches!(viewer.tick(), Ok(TickOutcome::Ran(_))));
        assert_eq!(log.borrow().draws[0].output, Some((800, 600)));
    }

    // ── frame loop ────────────────────────────────────────────────────────

    #[test]
    fn spinning_cube_end_to_end() {
        let mut bus = ResizeBus::new();
        let mut viewer = headless_viewer(&mut bus);
        let cube = add_cube(viewer.scene_mut());
        viewer.scene_mut().add_light(LightSource::directional(Vec3::new(0.2, 1.0, 1.0)));

        viewer.start_animation(move |scene: &mut Scene, _: &mut PerspectiveCamera, _| {
            if let Some(node) = scene.node_mut(cube) {
                node.transform.rotate_y(0.009);
            }
            LoopControl::Continue
        });

        assert_eq!(viewer.run_ticks(10).unwrap(), 10);
        assert_eq!(viewer.renderer().frames_drawn(), 10);
        assert!((y_rotation(viewer.scene(), cube) - 0.09).abs() < 1e-5);

        let plan = viewer.renderer().last_plan();
        assert_eq!(plan.items.len(), 1);
        assert!(plan.skipped.is_empty());
        assert_eq!(plan.lighting.directional.len(), 1);
    }

    #[test]
    fn stopped_viewer_does_not_draw() {
        let mut bus = ResizeBus::new();
        let mut viewer = headless_viewer(&mut bus);
        viewer.start_animation(|_: &mut Scene, _: &mut PerspectiveCamera, _| LoopControl::Continue);
        viewer.run_ticks(3).unwrap();
        viewer.stop();

        assert_eq!(viewer.run_ticks(5).unwrap(), 0);
        assert_eq!(viewer.renderer().frames_drawn(), 3);

        viewer.start_animation(|_: &mut Scene, _: &mut PerspectiveCamera, _| LoopControl::Continue);
        assert_eq!(viewer.run_ticks(2).unwrap(), 2);
        assert_eq!(viewer.renderer().frames_drawn(), 5);
    }

    #[test]
    fn update_can_finish_the_loop() {
        let mut bus = ResizeBus::new();
        let mut viewer = headless_viewer(&mut bus);
        viewer.start_animation(|_: &mut Scene, _: &mut PerspectiveCamera, time: FrameTime| {
            if time.frame_index == 3 { LoopControl::Stop } else { LoopControl::Continue }
        });

        assert_eq!(viewer.run_ticks(10).unwrap(), 4);
        assert!(!viewer.is_running());
        assert_eq!(viewer.renderer().frames_drawn(), 4);
    }

    #[test]
    fn update_moves_the_camera_before_the_draw() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);
        viewer.start_animation(|_: &mut Scene, camera: &mut PerspectiveCamera, _| {
            // Orbit a quarter turn per tick around the origin at radius 4.
            let orbit = glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
            camera.position = orbit * camera.position;
            camera.look_at(Vec3::ZERO);
            LoopControl::Continue
        });

        assert_eq!(viewer.run_ticks(2).unwrap(), 2);

        let log = log.borrow();
        assert!((log.draws[0].eye - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
        assert!((log.draws[1].eye - Vec3::new(0.0, 0.0, -4.0)).length() < 1e-5);
        assert!((viewer.camera().forward() - Vec3::Z).length() < 1e-5);
    }

    /// Orbits while focused; window events toggle it the way input controls would.
    #[derive(Default)]
    struct FocusOrbit {
        paused: bool,
        updates: u32,
    }

    impl App for FocusOrbit {
        fn on_window_event(&mut self, event: &WindowEvent) -> LoopControl {
            match event {
                WindowEvent::Focused(focused) => self.paused = !focused,
                WindowEvent::Destroyed => return LoopControl::Stop,
                _ => {}
            }
            LoopControl::Continue
        }

        fn update(
            &mut self,
            _scene: &mut Scene,
            camera: &mut PerspectiveCamera,
            _time: FrameTime,
        ) -> LoopControl {
            self.updates += 1;
            if !self.paused {
                camera.position = glam::Quat::from_rotation_y(0.1) * camera.position;
            }
            LoopControl::Continue
        }
    }

    #[test]
    fn app_events_steer_the_next_updates() {
        let mut bus = ResizeBus::new();
        let (mut viewer, log) = recording_viewer(&mut bus, 800, 600);
        let app = Rc::new(RefCell::new(FocusOrbit::default()));
        viewer.start_app(app.clone());

        viewer.run_ticks(1).unwrap();
        let moved = viewer.camera().position;
        assert_ne!(moved, Vec3::new(0.0, 0.0, 4.0));

        let control = app.borrow_mut().on_window_event(&WindowEvent::Focused(false));
        assert_eq!(control, LoopControl::Continue);
        viewer.run_ticks(3).unwrap();
        assert_eq!(viewer.camera().position, moved);
        assert_eq!(app.borrow().updates, 4);
        assert_eq!(log.borrow().draws.len(), 4);

        app.borrow_mut().on_window_event(&WindowEvent::Focused(true));
        viewer.run_ticks(1).unwrap();
        assert_ne!(viewer.camera().position, moved);
        assert_eq!(app.borrow_mut().on_window_event(&WindowEvent::Destroyed), LoopControl::Stop);
    }

    #[test]
    fn surface_loss_stops_the_loop() {
        let mut bus = ResizeBus::new();
        let mut viewer = headless_viewer(&mut bus);
        viewer.start_animation(|_: &mut Scene, _: &mut PerspectiveCamera, _| LoopControl::Continue);
        viewer.run_ticks(2).unwrap();

        viewer.state_mut().renderer_mut().lose_surface();
        let err = viewer.run_ticks(5).unwrap_err();
        assert!(matches!(err, ViewerError::SurfaceUnavailable { .. }));
        assert!(!viewer.is_running());
        assert!(matches!(viewer.tick(), Ok(TickOutcome::Idle)));
        assert_eq!(viewer.renderer().frames_drawn(), 2);
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn teardown_unsubscribes_and_returns_renderer() {
        let mut bus = ResizeBus::new();
        let mut viewer = headless_viewer(&mut bus);
        viewer.start_animation(|_: &mut Scene, _: &mut PerspectiveCamera, _| LoopControl::Continue);
        viewer.run_ticks(1).unwrap();

        let renderer = viewer.teardown(&mut bus);
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.publish(ResizeEvent::new(10, 10, 1.0)), 0);
        assert_eq!(renderer.frames_drawn(), 1);
    }
}
