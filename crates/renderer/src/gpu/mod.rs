//! GPU orchestration for the wormhole tunnel.
//!
//! - `context` owns wgpu instance/device/surface wiring and knows how to
//!   rebuild swapchain state when the window resizes.
//! - `mesh` uploads the cylinder geometry into vertex/index buffers.
//! - `pipeline` compiles the embedded GLSL into a back-face, depth-tested,
//!   alpha-blended render pipeline with a single uniform bind group.
//! - `uniforms` mirrors the std140 `WormholeParams` block and is rebuilt from
//!   the `Wormhole` context every frame.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod mesh;
mod pipeline;
mod state;
mod uniforms;

pub(crate) use state::GpuState;
