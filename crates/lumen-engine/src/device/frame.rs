/// One acquired swapchain image plus the encoder recording into it.
///
/// Hand it back to [`Gpu::submit`](super::Gpu::submit) in the same frame;
/// holding it blocks the next acquisition.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
