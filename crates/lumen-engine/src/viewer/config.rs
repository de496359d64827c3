use glam::Vec3;

use crate::paint::Color;

/// Construction-time settings for a [`Viewer`](super::Viewer).
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub background: Color,
    pub camera_position: Vec3,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            background: Color::from_hex(0x2e1a47),
            camera_position: Vec3::new(0.0, 0.0, 4.0),
        }
    }
}
