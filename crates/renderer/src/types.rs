use std::time::Duration;

use tunnel::{AnimationTunables, FogParameters, ShadingInputs};

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Pick the gamma-encoded swapchain the colour field was tuned for.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and use sRGB swapchains for conversion.
    Linear,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Immutable configuration passed to the renderer at start-up.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels.
    pub surface_size: (u32, u32),
    pub title: String,
    /// Optional FPS cap; `None` renders on every redraw.
    pub target_fps: Option<f32>,
    pub antialiasing: Antialiasing,
    pub color_space: ColorSpaceMode,
    /// Close the window after this long.
    pub exit_after: Option<Duration>,
    pub tunables: AnimationTunables,
    pub fog: FogParameters,
    pub shading: ShadingInputs,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            surface_size: (1280, 720),
            title: "Wormhole".into(),
            target_fps: None,
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            exit_after: None,
            tunables: AnimationTunables::default(),
            fog: FogParameters::default(),
            shading: ShadingInputs::default(),
        }
    }
}
