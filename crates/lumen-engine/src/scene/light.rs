use glam::Vec3;

use crate::paint::Color;

/// Light source variants.
///
/// Lights carry no position; the viewer core only has infinitely distant and
/// ambient lights.
#[derive(Debug, Clone, PartialEq)]
pub enum LightSource {
    /// Uniform light from every direction.
    Ambient { color: Color, intensity: f32 },

    /// Ambient light blended between `sky` (normals facing +Y) and `ground`
    /// (normals facing -Y).
    Hemisphere { sky: Color, ground: Color, intensity: f32 },

    /// Parallel light rays. `direction` points from the scene toward the light
    /// and does not need to be normalized.
    Directional { color: Color, intensity: f32, direction: Vec3 },
}

impl LightSource {
    #[inline]
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    #[inline]
    pub fn hemisphere(sky: Color, ground: Color, intensity: f32) -> Self {
        Self::Hemisphere { sky, ground, intensity }
    }

    /// White directional light of intensity 1, coming from `direction`.
    #[inline]
    pub fn directional(direction: Vec3) -> Self {
        Self::Directional { color: Color::WHITE, intensity: 1.0, direction }
    }
}
