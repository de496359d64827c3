/// Linear RGB color.
///
/// Invariant:
/// - components are linear-light, not sRGB-encoded.
///
/// Colors written as hex literals (`0x2e1a47`) are sRGB; use [`Color::from_hex`]
/// or [`Color::from_srgb_u8`] which decode them. The surface is sRGB when
/// available, so the final encode happens in hardware.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::linear(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::linear(1.0, 1.0, 1.0);

    #[inline]
    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decodes a `0xRRGGBB` sRGB literal.
    #[inline]
    pub fn from_hex(rgb: u32) -> Self {
        Self::from_srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Decodes straight sRGB bytes (`0`–`255`).
    pub fn from_srgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self::linear(
            srgb_to_linear(r as f32 / 255.0),
            srgb_to_linear(g as f32 / 255.0),
            srgb_to_linear(b as f32 / 255.0),
        )
    }

    /// Multiplies every channel by `k` (light intensity).
    #[inline]
    pub fn scaled(self, k: f32) -> Self {
        Self::linear(self.r * k, self.g * k, self.b * k)
    }

    /// RGB plus a trailing `w`, for 16-byte aligned uniform slots.
    #[inline]
    pub fn extend(self, w: f32) -> [f32; 4] {
        [self.r, self.g, self.b, w]
    }
}

impl std::ops::Add for Color {
    type Output = Color;

    #[inline]
    fn add(self, rhs: Color) -> Color {
        Color::linear(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl std::ops::AddAssign for Color {
    #[inline]
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
