use std::sync::Arc;

use anyhow::Result;
use glam::Vec3;

use lumen_engine::camera::PerspectiveCamera;
use lumen_engine::core::{App, LoopControl};
use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::paint::{Color, Material};
use lumen_engine::scene::{Geometry, LightSource, NodeId, RenderableNode, Scene};
use lumen_engine::time::FrameTime;
use lumen_engine::viewer::ViewerConfig;
use lumen_engine::window::{Runtime, RuntimeConfig};

/// Radians per frame around the cube's local Y axis.
const SPIN_PER_FRAME: f32 = 0.009;

#[derive(Default)]
struct SpinningCube {
    cube: Option<NodeId>,
}

impl App for SpinningCube {
    fn setup(&mut self, scene: &mut Scene, _camera: &mut PerspectiveCamera) {
        scene.add_light(LightSource::hemisphere(
            Color::from_hex(0xffffff),
            Color::from_hex(0xbbbbff),
            0.3,
        ));
        scene.add_light(LightSource::directional(Vec3::new(0.2, 1.0, 1.0)));

        let geometry = Arc::new(Geometry::cuboid(1.0, 1.0, 1.0));
        let material = Arc::new(Material::lambert(Color::from_hex(0x0000ff)));
        self.cube = Some(scene.add_node(RenderableNode::new(geometry, material)));

        log::info!("scene ready: {} node(s), {} light(s)", scene.node_count(), scene.light_count());
    }

    fn update(
        &mut self,
        scene: &mut Scene,
        _camera: &mut PerspectiveCamera,
        _time: FrameTime,
    ) -> LoopControl {
        let Some(id) = self.cube else { return LoopControl::Continue };
        if let Some(node) = scene.node_mut(id) {
            node.transform.rotate_y(SPIN_PER_FRAME);
        }
        LoopControl::Continue
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "lumen · spinning cube".to_string(),
        ..RuntimeConfig::default()
    };

    Runtime::run(config, GpuInit::default(), ViewerConfig::default(), SpinningCube::default())
}
