//! Appearance model shared between scenes and renderers.
//!
//! Scope:
//! - color representation (linear RGB)
//! - materials (tagged variants, no inheritance)
//!
//! Geometry types live in `scene`.

pub mod color;
pub mod material;

pub use color::Color;
pub use material::{Material, ShadingModel};
