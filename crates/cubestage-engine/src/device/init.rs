/// Surface and device options for the stage window.
///
/// The defaults draw one stage frame per display refresh on an sRGB surface
/// with no optional wgpu features; every stage runs on baseline limits.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Picks an sRGB surface format when the surface offers one, so stage
    /// clear colors and vertex colors land as authored.
    pub prefer_srgb: bool,

    /// FIFO by default: each `Renderer::tick` maps to one vblank.
    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the surface may queue ahead of the display. A hint.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pace_to_the_display_without_extra_features() {
        let init = GpuInit::default();
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
        assert!(init.prefer_srgb);
        assert!(init.required_features.is_empty());
        assert!(init.alpha_mode.is_none());
    }
}
