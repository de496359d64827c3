use crate::error::ViewerError;

/// Drawable-surface geometry as last reported by the host.
///
/// `width`/`height` are physical pixels. `pixel_ratio` maps logical to physical
/// pixels (winit's scale factor, the browser's `devicePixelRatio`).
///
/// Invariant: both dimensions are non-zero and `pixel_ratio` is finite and
/// positive. The only way to build one is [`ViewportState::new`], which checks it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    width: u32,
    height: u32,
    pixel_ratio: f32,
}

impl ViewportState {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Result<Self, ViewerError> {
        if width == 0 || height == 0 || !(pixel_ratio.is_finite() && pixel_ratio > 0.0) {
            return Err(ViewerError::InvalidViewport { width, height });
        }
        Ok(Self { width, height, pixel_ratio })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// `(width, height)` in physical pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `(width, height)` in logical pixels.
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.width as f32 / self.pixel_ratio,
            self.height as f32 / self.pixel_ratio,
        )
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}
