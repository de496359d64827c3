//! Scene graph types.
//!
//! Responsibilities:
//! - own renderable nodes and lights
//! - provide deterministic ordering (insertion order, stable under removal)
//! - keep nodes free of back-references to the scene (no ownership cycles)

mod geometry;
mod graph;
mod light;
mod node;

pub use geometry::{Geometry, GeometryId, MeshVertex};
pub use graph::Scene;
pub use light::LightSource;
pub use node::{LightId, NodeId, RenderableNode};
