//! Uniform blocks and vertex layouts shared with `shaders/mesh.wgsl`.

use bytemuck::{Pod, Zeroable};

use crate::scene::MeshVertex;

use super::plan::{DrawItem, FramePlan, MAX_DIRECTIONAL_LIGHTS};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── frame uniform (group 0) ───────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub sky: [f32; 4],
    pub ground: [f32; 4],
    pub light_dirs: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub light_colors: [[f32; 4]; MAX_DIRECTIONAL_LIGHTS],
    pub light_count: [u32; 4], // x used, rest pads to 16 bytes
}

impl FrameUniform {
    pub(super) fn from_plan(plan: &FramePlan) -> Self {
        let mut u = Self::zeroed();
        u.view_proj = plan.view_proj.to_cols_array_2d();
        u.camera_pos = plan.camera_position.extend(1.0).into();
        u.ambient = plan.lighting.ambient.extend(0.0);
        u.sky = plan.lighting.sky.extend(0.0);
        u.ground = plan.lighting.ground.extend(0.0);
        for (i, (dir, color)) in plan.lighting.directional.iter().enumerate() {
            u.light_dirs[i] = dir.extend(0.0).into();
            u.light_colors[i] = color.extend(0.0);
        }
        u.light_count[0] = plan.lighting.directional.len() as u32;
        u
    }
}

// ── node uniform (group 1, dynamic offset) ────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3], // mat3x3 columns padded to vec4
    pub color: [f32; 4],
    pub shading: [u32; 4], // x = ShadingModel
}

impl NodeUniform {
    pub(super) fn from_item(item: &DrawItem) -> Self {
        let n = item.normal;
        Self {
            model: item.model.to_cols_array_2d(),
            normal: [
                n.x_axis.extend(0.0).into(),
                n.y_axis.extend(0.0).into(),
                n.z_axis.extend(0.0).into(),
            ],
            color: item.color.extend(1.0),
            shading: [item.shading as u32, 0, 0, 0],
        }
    }
}

/// Byte distance between consecutive node uniforms in the dynamic-offset buffer.
pub(super) fn node_uniform_stride(min_alignment: u32) -> u64 {
    let size = std::mem::size_of::<NodeUniform>() as u64;
    let align = u64::from(min_alignment.max(1));
    size.div_ceil(align) * align
}

/// Returns the `wgpu` minimum binding size for a uniform block of type `T`.
///
/// Both uniform blocks are non-empty structs, so the size is never zero.
/// Centralising this avoids `.unwrap()` at each pipeline-creation site.
pub(super) fn min_binding_size<T>() -> std::num::NonZeroU64 {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
        .expect("uniform blocks have non-zero size by construction")
}

// ── vertex layout ─────────────────────────────────────────────────────────

impl MeshVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FrameUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<NodeUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniform>(), 272);
        assert_eq!(std::mem::size_of::<NodeUniform>(), 144);
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(node_uniform_stride(256), 256);
        assert_eq!(node_uniform_stride(64), 192);
        assert_eq!(node_uniform_stride(0), 144);
    }
}
