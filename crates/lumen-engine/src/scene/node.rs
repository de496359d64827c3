use std::fmt;
use std::sync::Arc;

use crate::coords::Transform;
use crate::paint::Material;

use super::Geometry;

/// Handle to a node owned by a [`Scene`](super::Scene).
///
/// Ids are handed out in increasing order and never reused within one scene.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a light owned by a [`Scene`](super::Scene).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LightId(pub(crate) u64);

/// Something the renderer can draw: shared shape + shared appearance + own transform.
///
/// Geometry and material are reference counted; cloning a node (or building
/// many nodes from the same `Arc`s) never copies mesh data.
#[derive(Debug, Clone)]
pub struct RenderableNode {
    pub geometry: Arc<Geometry>,
    pub material: Arc<Material>,
    pub transform: Transform,
}

impl RenderableNode {
    pub fn new(geometry: Arc<Geometry>, material: Arc<Material>) -> Self {
        Self {
            geometry,
            material,
            transform: Transform::IDENTITY,
        }
    }

    #[inline]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}
