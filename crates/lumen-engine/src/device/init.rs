/// How the swapchain should treat the linear colors the renderer writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceEncoding {
    /// Pick an `*Srgb` format so the hardware encodes on write.
    Srgb,
    /// Pick a non-sRGB format; colors reach the display unencoded.
    Linear,
}

/// Settings for acquiring the adapter, device and surface.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub backends: wgpu::Backends,
    pub power_preference: wgpu::PowerPreference,
    pub encoding: SurfaceEncoding,

    /// Requested present mode. Falls back to `Fifo` when the surface does not
    /// support it. `Fifo` paces the frame loop to the display refresh.
    pub present_mode: wgpu::PresentMode,

    /// `None` takes the first mode the surface reports.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_limits: wgpu::Limits,
    pub max_frame_latency: u32,
}

impl GpuInit {
    /// Switches between display-paced (`Fifo`) and unpaced presentation.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            encoding: SurfaceEncoding::Srgb,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_limits: wgpu::Limits::default(),
            max_frame_latency: 2,
        }
    }
}
