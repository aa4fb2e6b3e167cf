//! Renderer crate for the wormhole tunnel.
//!
//! The crate glues the winit window, the `wgpu` pipeline and the embedded
//! GLSL colour field together. The overall flow is:
//!
//! ```text
//!   CLI / wormhole
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                        │                  │                   │
//!                        │   MouseWheel ────┘                   ├─▶ Wormhole::tick(clock)
//!                        │   └─▶ Wormhole::scroll               └─▶ GpuState::render ─▶ UBO
//!                        └─▶ FrameScheduler (optional FPS cap, exit timer)
//! ```
//!
//! `WindowState` owns the GPU resources and the `tunnel::Wormhole` context,
//! so there is exactly one owner of the animation state and no locking.
//! Shaders are compiled once at start-up; any parse or validation failure
//! aborts before the window starts drawing.

mod compile;
mod gpu;
mod runtime;
mod types;
mod window;

use anyhow::Result;

pub use compile::{fragment_source, validate_glsl, vertex_source, ShaderError};
pub use runtime::FrameScheduler;
pub use types::{Antialiasing, ColorSpaceMode, RendererConfig};
pub use wgpu::naga::ShaderStage;

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and blocks until it closes.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            width = self.config.surface_size.0,
            height = self.config.surface_size.1,
            fps = ?self.config.target_fps,
            antialiasing = ?self.config.antialiasing,
            "starting wormhole renderer"
        );
        window::run(self.config)
    }
}

/// Validates both embedded shader stages without touching a GPU.
pub fn check_shaders() -> Result<(), ShaderError> {
    validate_glsl(ShaderStage::Vertex, &vertex_source())?;
    validate_glsl(ShaderStage::Fragment, &fragment_source())?;
    Ok(())
}
