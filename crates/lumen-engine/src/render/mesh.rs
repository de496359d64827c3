use std::collections::{HashMap, HashSet};

use winit::dpi::PhysicalSize;
use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::coords::ViewportState;
use crate::device::{Gpu, SurfaceErrorAction};
use crate::error::ViewerError;
use crate::scene::{Geometry, GeometryId, MeshVertex, Scene};

use super::ctx::{DepthTarget, RenderTarget};
use super::gpu_types::{
    min_binding_size, node_uniform_stride, FrameUniform, NodeUniform, DEPTH_FORMAT,
};
use super::plan::{FramePlan, PlanDiagnostics};
use super::{FrameStats, Renderer};

/// Vertex + index buffers for one uploaded geometry.
struct GpuMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh vbo"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh ibo"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vbo,
            ibo,
            index_count: geometry.indices().len() as u32,
        }
    }
}

/// Forward renderer for opaque meshes on wgpu.
///
/// One pass per frame: clear color + depth, then one indexed draw per node.
/// Per-frame data (camera, lighting) lives in a single uniform block; per-node
/// data (model/normal matrices, color, shading model) in one buffer addressed
/// with dynamic offsets.
///
/// Owns the `Gpu` (and through it the surface). GPU resources are created lazily
/// and released on drop; the depth buffer is reallocated by every `configure`.
pub struct MeshRenderer {
    gpu: Gpu,
    viewport: Option<ViewportState>,
    depth: Option<DepthTarget>,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    frame_bgl: Option<wgpu::BindGroupLayout>,
    node_bgl: Option<wgpu::BindGroupLayout>,

    frame_ubo: Option<wgpu::Buffer>,
    frame_bind_group: Option<wgpu::BindGroup>,

    node_ubo: Option<wgpu::Buffer>,
    node_bind_group: Option<wgpu::BindGroup>,
    node_capacity: usize,
    node_stride: u64,
    node_staging: Vec<u8>,

    meshes: HashMap<GeometryId, GpuMesh>,
    live_meshes: HashSet<GeometryId>,

    plan: FramePlan,
    diagnostics: PlanDiagnostics,
}

impl MeshRenderer {
    pub fn new(gpu: Gpu) -> Self {
        let node_stride =
            node_uniform_stride(gpu.device().limits().min_uniform_buffer_offset_alignment);
        Self {
            gpu,
            viewport: None,
            depth: None,
            pipeline_format: None,
            pipeline: None,
            frame_bgl: None,
            node_bgl: None,
            frame_ubo: None,
            frame_bind_group: None,
            node_ubo: None,
            node_bind_group: None,
            node_capacity: 0,
            node_stride,
            node_staging: Vec::new(),
            meshes: HashMap::new(),
            live_meshes: HashSet::new(),
            plan: FramePlan::default(),
            diagnostics: PlanDiagnostics::default(),
        }
    }

    fn ensure_pipeline(&mut self) {
        let format = self.gpu.surface_format();
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }
        let device = self.gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lumen mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen frame bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(min_binding_size::<FrameUniform>()),
                },
                count: None,
            }],
        });

        let node_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("lumen node bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: Some(min_binding_size::<NodeUniform>()),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lumen mesh pipeline layout"),
            bind_group_layouts: &[&frame_bgl, &node_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lumen mesh pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[MeshVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
        self.frame_bgl = Some(frame_bgl);
        self.node_bgl = Some(node_bgl);

        // Bind groups were built against the old layouts.
        self.frame_ubo = None;
        self.frame_bind_group = None;
        self.node_ubo = None;
        self.node_bind_group = None;
        self.node_capacity = 0;
    }

    fn ensure_frame_bindings(&mut self) {
        if self.frame_bind_group.is_some() && self.frame_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.frame_bgl.as_ref() else { return };
        let device = self.gpu.device();

        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen frame ubo"),
            size: std::mem::size_of::<FrameUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen frame bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        self.frame_ubo = Some(ubo);
        self.frame_bind_group = Some(bind_group);
    }

    fn ensure_node_capacity(&mut self, required: usize) {
        if required <= self.node_capacity && self.node_bind_group.is_some() {
            return;
        }
        let Some(bgl) = self.node_bgl.as_ref() else { return };
        let device = self.gpu.device();

        let new_cap = required.next_power_of_two().max(16);
        let ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen node ubo"),
            size: new_cap as u64 * self.node_stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("lumen node bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &ubo,
                    offset: 0,
                    size: Some(min_binding_size::<NodeUniform>()),
                }),
            }],
        });

        self.node_ubo = Some(ubo);
        self.node_bind_group = Some(bind_group);
        self.node_capacity = new_cap;
    }

    /// Uploads geometry seen for the first time and frees buffers of geometry
    /// no node references any more.
    fn sync_meshes(&mut self) {
        self.live_meshes.clear();
        for item in &self.plan.items {
            let id = item.geometry.id();
            self.live_meshes.insert(id);
            if !self.meshes.contains_key(&id) {
                let mesh = GpuMesh::upload(self.gpu.device(), &item.geometry);
                self.meshes.insert(id, mesh);
            }
        }
        let live = &self.live_meshes;
        self.meshes.retain(|id, _| live.contains(id));
    }

    fn write_uniforms(&mut self) {
        if let Some(ubo) = self.frame_ubo.as_ref() {
            let u = FrameUniform::from_plan(&self.plan);
            self.gpu.queue().write_buffer(ubo, 0, bytemuck::bytes_of(&u));
        }

        let Some(ubo) = self.node_ubo.as_ref() else { return };
        if self.plan.items.is_empty() {
            return;
        }
        let stride = self.node_stride as usize;
        self.node_staging.clear();
        self.node_staging.resize(self.plan.items.len() * stride, 0);
        for (i, item) in self.plan.items.iter().enumerate() {
            let u = NodeUniform::from_item(item);
            let bytes = bytemuck::bytes_of(&u);
            self.node_staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        self.gpu.queue().write_buffer(ubo, 0, &self.node_staging);
    }

    fn encode_pass(&self, target: &mut RenderTarget<'_>) {
        let clear = self.plan.clear;
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("lumen forward pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.r as f64,
                        g: clear.g as f64,
                        b: clear.b as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: target.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if self.plan.items.is_empty() {
            return;
        }
        let Some(pipeline) = self.pipeline.as_ref() else { return };
        let Some(frame_bg) = self.frame_bind_group.as_ref() else { return };
        let Some(node_bg) = self.node_bind_group.as_ref() else { return };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_bg, &[]);

        for (i, item) in self.plan.items.iter().enumerate() {
            let Some(mesh) = self.meshes.get(&item.geometry.id()) else { continue };
            let offset = (i as u64 * self.node_stride) as u32;
            rpass.set_bind_group(1, node_bg, &[offset]);
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

impl Renderer for MeshRenderer {
    fn configure(&mut self, viewport: &ViewportState) -> Result<(), ViewerError> {
        let (width, height) = viewport.size();
        self.gpu.resize(PhysicalSize::new(width, height));
        // Replacing the target drops (and releases) the previous depth texture.
        self.depth = Some(DepthTarget::new(self.gpu.device(), width, height));
        self.viewport = Some(*viewport);
        log::debug!("surface configured to {width}x{height} @ {}", viewport.pixel_ratio());
        Ok(())
    }

    fn draw_frame(
        &mut self,
        scene: &Scene,
        camera: &mut PerspectiveCamera,
    ) -> Result<FrameStats, ViewerError> {
        if self.viewport.is_none() {
            return Err(ViewerError::surface("renderer not configured"));
        }

        self.plan.rebuild(scene, camera);
        self.diagnostics.report(&self.plan);

        self.ensure_pipeline();
        self.ensure_frame_bindings();
        self.ensure_node_capacity(self.plan.items.len());
        self.sync_meshes();
        self.write_uniforms();

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                return match self.gpu.handle_surface_error(&err) {
                    SurfaceErrorAction::Fatal => Err(ViewerError::surface(err.to_string())),
                    action => {
                        log::debug!("frame dropped ({err}): {action:?}");
                        Ok(FrameStats::from_plan(&self.plan, false))
                    }
                };
            }
        };

        let Some(depth) = self.depth.as_ref() else {
            return Err(ViewerError::surface("depth target missing"));
        };

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view, &depth.view);
            self.encode_pass(&mut target);
        }

        self.gpu.submit(frame);

        Ok(FrameStats::from_plan(&self.plan, true))
    }

    fn output_size(&self) -> Option<(u32, u32)> {
        self.viewport.map(|v| v.size())
    }
}
