use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Vertex with position and normal, in the layout uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Process-unique geometry identity.
///
/// Renderers key uploaded vertex/index buffers by this id, so two nodes sharing
/// one `Arc<Geometry>` share one GPU upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GeometryId(u64);

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Immutable indexed triangle mesh.
#[derive(Debug)]
pub struct Geometry {
    id: GeometryId,
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl Geometry {
    /// Builds a mesh from triangle-list indices.
    ///
    /// Returns `None` if the index count is not a multiple of three or an index
    /// points past the vertex list.
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Option<Self> {
        if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= vertices.len()) {
            return None;
        }
        Some(Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            vertices,
            indices,
        })
    }

    /// Axis-aligned box centred on the origin with flat per-face normals.
    ///
    /// 24 vertices (4 per face) and 36 indices, counter-clockwise when seen from
    /// outside.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;

        // (normal, u, v) with u x v == normal.
        let faces = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * half;
                vertices.push(MeshVertex {
                    position: p.into(),
                    normal: n.into(),
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            vertices,
            indices,
        }
    }

    #[inline]
    pub fn id(&self) -> GeometryId {
        self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
