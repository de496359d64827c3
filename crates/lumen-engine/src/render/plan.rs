use std::collections::HashSet;
use std::sync::Arc;

use glam::{Mat3, Mat4, Vec3};

use crate::camera::PerspectiveCamera;
use crate::error::ViewerError;
use crate::paint::{Color, ShadingModel};
use crate::scene::{Geometry, LightSource, NodeId, Scene};

/// Directional lights beyond this count are dropped (one uniform block, fixed size).
pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;

/// Lighting accumulated from every light in a scene.
///
/// Ambient lights sum into `ambient`; hemisphere lights sum into `sky` and
/// `ground`; directional lights keep their own slot, pre-scaled by intensity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lighting {
    pub ambient: Color,
    pub sky: Color,
    pub ground: Color,
    /// `(unit direction toward the light, color * intensity)`.
    pub directional: Vec<(Vec3, Color)>,
}

impl Lighting {
    fn clear(&mut self) {
        self.ambient = Color::BLACK;
        self.sky = Color::BLACK;
        self.ground = Color::BLACK;
        self.directional.clear();
    }

    /// Light arriving at a diffuse surface with unit normal `n`.
    ///
    /// Same model as the mesh shader; the GPU path must agree with this.
    pub fn irradiance(&self, n: Vec3) -> Color {
        let t = 0.5 * n.y + 0.5;
        let hemi = self.ground.scaled(1.0 - t) + self.sky.scaled(t);
        let mut total = self.ambient + hemi;
        for (dir, color) in &self.directional {
            total += color.scaled(n.dot(*dir).max(0.0));
        }
        total
    }
}

/// One node ready to be drawn.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub node: NodeId,
    pub geometry: Arc<Geometry>,
    pub model: Mat4,
    pub normal: Mat3,
    pub color: Color,
    pub shading: ShadingModel,
}

/// Backend-independent half of `draw_frame`.
///
/// Built from a scene and camera each frame: resolves the clear color, the
/// view-projection, the accumulated lighting and one [`DrawItem`] per drawable
/// node, in scene order. Nodes whose material cannot be drawn end up in
/// `skipped` instead of aborting the frame.
///
/// The vectors are reused across frames; once warmed up `rebuild` does not allocate.
#[derive(Debug, Default)]
pub struct FramePlan {
    pub clear: Color,
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub items: Vec<DrawItem>,
    pub skipped: Vec<ViewerError>,
    /// Directional lights left out because of [`MAX_DIRECTIONAL_LIGHTS`].
    pub dropped_lights: usize,
    pub light_count: usize,
}

impl FramePlan {
    pub fn build(scene: &Scene, camera: &mut PerspectiveCamera) -> Self {
        let mut plan = Self::default();
        plan.rebuild(scene, camera);
        plan
    }

    pub fn rebuild(&mut self, scene: &Scene, camera: &mut PerspectiveCamera) {
        self.clear = scene.background();
        self.view_proj = camera.view_projection();
        self.camera_position = camera.position;

        self.accumulate_lights(scene);

        self.items.clear();
        self.skipped.clear();
        scene.for_each_node(|id, node| match node.material.shading_model() {
            Some(shading) => self.items.push(DrawItem {
                node: id,
                geometry: node.geometry.clone(),
                model: node.transform.matrix(),
                normal: node.transform.normal_matrix(),
                color: node.material.color(),
                shading,
            }),
            None => self.skipped.push(ViewerError::UnsupportedMaterial {
                node: id,
                kind: node.material.kind(),
            }),
        });
    }

    fn accumulate_lights(&mut self, scene: &Scene) {
        self.lighting.clear();
        self.dropped_lights = 0;
        self.light_count = scene.light_count();

        for (_, light) in scene.lights() {
            match light {
                LightSource::Ambient { color, intensity } => {
                    self.lighting.ambient += color.scaled(*intensity);
                }
                LightSource::Hemisphere { sky, ground, intensity } => {
                    self.lighting.sky += sky.scaled(*intensity);
                    self.lighting.ground += ground.scaled(*intensity);
                }
                LightSource::Directional { color, intensity, direction } => {
                    if self.lighting.directional.len() == MAX_DIRECTIONAL_LIGHTS {
                        self.dropped_lights += 1;
                        continue;
                    }
                    let dir = direction.normalize_or_zero();
                    if dir == Vec3::ZERO {
                        continue;
                    }
                    self.lighting.directional.push((dir, color.scaled(*intensity)));
                }
            }
        }
    }
}

/// Logs frame-plan problems without flooding the log at display rate.
///
/// Each skipped node is reported once; dropped lights once per renderer.
#[derive(Debug, Default)]
pub struct PlanDiagnostics {
    warned_nodes: HashSet<NodeId>,
    warned_lights: bool,
}

impl PlanDiagnostics {
    pub fn report(&mut self, plan: &FramePlan) {
        for err in &plan.skipped {
            if let ViewerError::UnsupportedMaterial { node, .. } = err {
                if self.warned_nodes.insert(*node) {
                    log::warn!("skipping node: {err}");
                }
            }
        }
        if plan.dropped_lights > 0 && !self.warned_lights {
            log::warn!(
                "{} directional light(s) ignored; at most {MAX_DIRECTIONAL_LIGHTS} are supported",
                plan.dropped_lights
            );
            self.warned_lights = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Material;
    use crate::scene::RenderableNode;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(60.0, 0.1, 100.0).unwrap();
        cam.position = Vec3::new(0.0, 0.0, 4.0);
        cam
    }

    fn node(material: Material) -> RenderableNode {
        RenderableNode::new(Arc::new(Geometry::cuboid(1.0, 1.0, 1.0)), Arc::new(material))
    }

    fn close(a: Color, b: Color) -> bool {
        (a.r - b.r).abs() < 1e-5 && (a.g - b.g).abs() < 1e-5 && (a.b - b.b).abs() < 1e-5
    }

    // ── lighting ──────────────────────────────────────────────────────────

    #[test]
    fn ambient_lights_sum() {
        let mut scene = Scene::default();
        scene.add_light(LightSource::ambient(Color::WHITE, 0.25));
        scene.add_light(LightSource::ambient(Color::linear(1.0, 0.0, 0.0), 0.5));
        let plan = FramePlan::build(&scene, &mut camera());
        assert_eq!(plan.lighting.ambient, Color::linear(0.75, 0.25, 0.25));
        assert_eq!(plan.light_count, 2);
    }

    #[test]
    fn hemisphere_blends_by_normal() {
        let mut scene = Scene::default();
        scene.add_light(LightSource::hemisphere(Color::WHITE, Color::BLACK, 0.5));
        let plan = FramePlan::build(&scene, &mut camera());
        assert!(close(plan.lighting.irradiance(Vec3::Y), Color::WHITE.scaled(0.5)));
        assert!(close(plan.lighting.irradiance(Vec3::NEG_Y), Color::BLACK));
        assert!(close(plan.lighting.irradiance(Vec3::X), Color::WHITE.scaled(0.25)));
    }

    #[test]
    fn directional_is_normalized_and_one_sided() {
        let mut scene = Scene::default();
        scene.add_light(LightSource::directional(Vec3::new(0.2, 1.0, 1.0)));
        let plan = FramePlan::build(&scene, &mut camera());

        let (dir, color) = plan.lighting.directional[0];
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert_eq!(color, Color::WHITE);
        assert!(close(plan.lighting.irradiance(dir), Color::WHITE));
        assert!(close(plan.lighting.irradiance(-dir), Color::BLACK));
    }

    #[test]
    fn directional_lights_are_capped() {
        let mut scene = Scene::default();
        for _ in 0..MAX_DIRECTIONAL_LIGHTS + 2 {
            scene.add_light(LightSource::directional(Vec3::Y));
        }
        let plan = FramePlan::build(&scene, &mut camera());
        assert_eq!(plan.lighting.directional.len(), MAX_DIRECTIONAL_LIGHTS);
        assert_eq!(plan.dropped_lights, 2);
    }

    #[test]
    fn zero_direction_contributes_nothing() {
        let mut scene = Scene::default();
        scene.add_light(LightSource::directional(Vec3::ZERO));
        let plan = FramePlan::build(&scene, &mut camera());
        assert!(plan.lighting.directional.is_empty());
    }

    // ── nodes ─────────────────────────────────────────────────────────────

    #[test]
    fn unsupported_material_is_skipped_not_fatal() {
        let mut scene = Scene::default();
        let a = scene.add_node(node(Material::lambert(Color::WHITE)));
        let glass = scene.add_node(node(Material::Translucent { color: Color::WHITE, opacity: 0.4 }));
        let c = scene.add_node(node(Material::unlit(Color::BLACK)));

        let plan = FramePlan::build(&scene, &mut camera());
        let drawn: Vec<_> = plan.items.iter().map(|i| i.node).collect();
        assert_eq!(drawn, vec![a, c]);
        assert_eq!(
            plan.skipped,
            vec![ViewerError::UnsupportedMaterial { node: glass, kind: "translucent" }]
        );
    }

    #[test]
    fn items_carry_transforms_and_clear_color() {
        let mut scene = Scene::new(Color::from_hex(0x2e1a47));
        let id = scene.add_node(node(Material::lambert(Color::WHITE)));
        scene.node_mut(id).unwrap().transform.rotate_y(0.3);

        let mut cam = camera();
        let plan = FramePlan::build(&scene, &mut cam);
        assert_eq!(plan.clear, Color::from_hex(0x2e1a47));
        assert_eq!(plan.items[0].model, scene.node(id).unwrap().transform.matrix());
        assert_eq!(plan.view_proj, cam.view_projection());
        assert_eq!(plan.items[0].shading, ShadingModel::Diffuse);
    }

    #[test]
    fn rebuild_replaces_previous_frame() {
        let mut scene = Scene::default();
        let a = scene.add_node(node(Material::lambert(Color::WHITE)));
        scene.add_light(LightSource::ambient(Color::WHITE, 1.0));
        let mut cam = camera();
        let mut plan = FramePlan::build(&scene, &mut cam);

        scene.remove_node(a);
        scene.add_light(LightSource::ambient(Color::WHITE, 1.0));
        plan.rebuild(&scene, &mut cam);
        assert!(plan.items.is_empty());
        assert_eq!(plan.lighting.ambient, Color::linear(2.0, 2.0, 2.0));
    }
}
