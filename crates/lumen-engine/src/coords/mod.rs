//! Spatial types shared by the camera, the scene and renderers.
//!
//! World space is right-handed, +Y up, camera looking down -Z. Viewport sizes
//! are physical pixels; the pixel ratio converts to logical pixels.

mod transform;
mod viewport;

pub use transform::Transform;
pub use viewport::ViewportState;
