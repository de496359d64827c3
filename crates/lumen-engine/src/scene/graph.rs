use crate::paint::Color;

use super::{LightId, LightSource, NodeId, RenderableNode};

/// Container of renderable nodes and lights.
///
/// Ordering:
/// - nodes and lights iterate in insertion order
/// - removal keeps the relative order of the survivors
///
/// Because ids are handed out monotonically and entries are only ever appended,
/// both vectors stay sorted by id and lookups are binary searches. Ids are
/// 64-bit so the counters cannot wrap within a process lifetime.
#[derive(Debug)]
pub struct Scene {
    background: Color,
    nodes: Vec<(NodeId, RenderableNode)>,
    lights: Vec<(LightId, LightSource)>,
    next_node: u64,
    next_light: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Color::BLACK)
    }
}

impl Scene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            nodes: Vec::new(),
            lights: Vec::new(),
            next_node: 0,
            next_light: 0,
        }
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    // ── nodes ─────────────────────────────────────────────────────────────

    pub fn add_node(&mut self, node: RenderableNode) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.push((id, node));
        id
    }

    /// Removes and returns the node, or `None` if `id` is not in this scene.
    pub fn remove_node(&mut self, id: NodeId) -> Option<RenderableNode> {
        let idx = self.node_index(id)?;
        Some(self.nodes.remove(idx).1)
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderableNode> {
        self.node_index(id).map(|i| &self.nodes[i].1)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut RenderableNode> {
        self.node_index(id).map(|i| &mut self.nodes[i].1)
    }

    /// Visits every node in insertion order.
    ///
    /// Traversal borrows the scene immutably; it can be repeated any number of
    /// times without re-registering nodes.
    pub fn for_each_node<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &RenderableNode),
    {
        for (id, node) in &self.nodes {
            visit(*id, node);
        }
    }

    /// Iterates nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RenderableNode)> + '_ {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.binary_search_by_key(&id, |(k, _)| *k).ok()
    }

    // ── lights ────────────────────────────────────────────────────────────

    pub fn add_light(&mut self, light: LightSource) -> LightId {
        let id = LightId(self.next_light);
        self.next_light += 1;
        self.lights.push((id, light));
        id
    }

    pub fn remove_light(&mut self, id: LightId) -> Option<LightSource> {
        let idx = self.lights.binary_search_by_key(&id, |(k, _)| *k).ok()?;
        Some(self.lights.remove(idx).1)
    }

    /// Iterates lights in insertion order.
    pub fn lights(&self) -> impl Iterator<Item = (LightId, &LightSource)> + '_ {
        self.lights.iter().map(|(id, l)| (*id, l))
    }

    #[inline]
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}
