use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use tunnel::{Clock, Scene, SystemClock, Viewport, Wormhole};
use winit::dpi::PhysicalSize;
use winit::event::{Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use crate::gpu::GpuState;
use crate::runtime::{earliest, FrameScheduler};
use crate::types::RendererConfig;

/// Window, GPU resources and the wormhole context driven by the event loop.
///
/// Everything lives on the event-loop thread, so scroll events and frame
/// ticks are applied strictly one after another.
pub(crate) struct WindowState {
    window: Arc<Window>,
    gpu: Option<GpuState>,
    wormhole: Wormhole,
    clock: SystemClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderFrameStatus {
    Presented,
    /// No GPU state; nothing was advanced or drawn.
    Skipped,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(
            window.as_ref(),
            size,
            config.antialiasing,
            config.color_space,
        )?;

        let scene = Scene::new(Viewport::new(size.width.max(1), size.height.max(1)))
            .with_fog(config.fog)
            .with_shading(config.shading);
        let wormhole = Wormhole::new(scene, config.tunables);

        Ok(Self {
            window,
            gpu: Some(gpu),
            wormhole,
            clock: SystemClock::new(),
        })
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu
            .as_ref()
            .map(GpuState::size)
            .unwrap_or_else(|| self.window.inner_size())
    }

    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if !self.wormhole.resize(new_size.width, new_size.height) {
            return;
        }
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(new_size);
        }
    }

    pub(crate) fn scroll(&mut self, delta: MouseScrollDelta) {
        self.wormhole.scroll(scroll_amount(delta));
    }

    pub(crate) fn render_frame(&mut self) -> Result<RenderFrameStatus, wgpu::SurfaceError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(RenderFrameStatus::Skipped);
        };
        self.wormhole.tick(self.clock.now());
        gpu.render(&self.wormhole)?;
        Ok(RenderFrameStatus::Presented)
    }
}

/// Vertical wheel movement with positive meaning "scroll down".
///
/// winit reports wheel-up as positive, the opposite of the page convention
/// the offset adjustment follows.
pub(crate) fn scroll_amount(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -f64::from(y),
        MouseScrollDelta::PixelDelta(position) => -position.y,
    }
}

/// Opens the window and drives the tunnel until it is closed.
pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(window_size)
        .build(&event_loop)
        .context("failed to create wormhole window")?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)?;
    let mut scheduler = FrameScheduler::new(config.target_fps);
    let exit_deadline = config.exit_after.map(|after| Instant::now() + after);
    if let Some(after) = config.exit_after {
        tracing::info!(after = ?after, "window will close automatically");
    }
    state.window().request_redraw();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(new_size);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        state.scroll(delta);
                    }
                    WindowEvent::RedrawRequested => match state.render_frame() {
                        Ok(RenderFrameStatus::Presented) => {
                            scheduler.mark_rendered();
                        }
                        Ok(RenderFrameStatus::Skipped) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.resize(state.size());
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            tracing::warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            tracing::warn!(error = ?other, "surface error; retrying next frame");
                        }
                    },
                    _ => {}
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                if exit_deadline.is_some_and(|deadline| now >= deadline) {
                    tracing::info!("exit timer elapsed; closing window");
                    elwt.exit();
                    return;
                }
                if scheduler.ready_for_frame(now) {
                    tracing::trace!("scheduler: issuing redraw now");
                    state.window().request_redraw();
                    elwt.set_control_flow(ControlFlow::Wait);
                } else if let Some(deadline) = earliest(scheduler.next_deadline(), exit_deadline)
                {
                    tracing::trace!(
                        deadline_ms = deadline.saturating_duration_since(now).as_millis(),
                        "scheduler: waiting until next frame"
                    );
                    elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                } else {
                    elwt.set_control_flow(ControlFlow::Wait);
                }
            }
            _ => {}
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use winit::dpi::PhysicalPosition;

    use super::*;

    #[test]
    fn wheel_up_decreases_and_wheel_down_increases() {
        assert!(scroll_amount(MouseScrollDelta::LineDelta(0.0, 1.0)) < 0.0);
        assert!(scroll_amount(MouseScrollDelta::LineDelta(0.0, -3.0)) > 0.0);
        assert!(
            scroll_amount(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0))) > 0.0
        );
    }
}
