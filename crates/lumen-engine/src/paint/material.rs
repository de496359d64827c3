use super::Color;

/// Shading model a renderer selects for an opaque material.
///
/// The numeric value is what the mesh shader switches on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShadingModel {
    /// Flat base color, lights ignored.
    Unlit = 0,
    /// Lambertian diffuse under the scene's lights.
    Diffuse = 1,
}

/// Surface appearance shared between renderable nodes.
///
/// This is intentionally a small enum. The viewer core only draws opaque
/// surfaces, so every renderer may reject `Translucent`; it exists so scenes can
/// describe it and renderers can report it instead of drawing it wrong.
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Unlit { color: Color },
    Lambert { color: Color },
    Translucent { color: Color, opacity: f32 },
}

impl Material {
    #[inline]
    pub fn lambert(color: Color) -> Self {
        Material::Lambert { color }
    }

    #[inline]
    pub fn unlit(color: Color) -> Self {
        Material::Unlit { color }
    }

    #[inline]
    pub fn color(&self) -> Color {
        match self {
            Material::Unlit { color }
            | Material::Lambert { color }
            | Material::Translucent { color, .. } => *color,
        }
    }

    /// Stable variant name used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Material::Unlit { .. } => "unlit",
            Material::Lambert { .. } => "lambert",
            Material::Translucent { .. } => "translucent",
        }
    }

    /// Shading model for opaque variants; `None` when the material needs
    /// blending or sorting.
    pub fn shading_model(&self) -> Option<ShadingModel> {
        match self {
            Material::Unlit { .. } => Some(ShadingModel::Unlit),
            Material::Lambert { .. } => Some(ShadingModel::Diffuse),
            Material::Translucent { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translucent_has_no_shading_model() {
        let m = Material::Translucent { color: Color::WHITE, opacity: 0.5 };
        assert_eq!(m.shading_model(), None);
        assert_eq!(m.kind(), "translucent");
    }

    #[test]
    fn fully_opaque_translucent_is_still_not_drawable() {
        let m = Material::Translucent { color: Color::WHITE, opacity: 1.0 };
        assert_eq!(m.shading_model(), None);
    }

    #[test]
    fn opaque_variants_map_to_models() {
        assert_eq!(Material::unlit(Color::BLACK).shading_model(), Some(ShadingModel::Unlit));
        assert_eq!(Material::lambert(Color::BLACK).shading_model(), Some(ShadingModel::Diffuse));
    }
}
