use crate::animation::{AnimationState, AnimationTunables, Animator};
use crate::clock::ClockReading;
use crate::field::FieldUniforms;
use crate::scene::Scene;

/// Owns the scene and its animation; the single source of per-frame state.
#[derive(Debug, Clone)]
pub struct Wormhole {
    scene: Scene,
    animator: Animator,
}

impl Wormhole {
    pub fn new(scene: Scene, tunables: AnimationTunables) -> Self {
        Self {
            scene,
            animator: Animator::new(tunables),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn animation(&self) -> &AnimationState {
        self.animator.state()
    }

    /// Advances one frame and pushes the camera roll and mesh spin into the scene.
    pub fn tick(&mut self, reading: ClockReading) {
        let state = *self.animator.tick(reading);
        self.scene.camera.roll = state.camera_roll as f32;
        self.scene.mesh.spin_y = state.mesh_spin as f32;
    }

    pub fn scroll(&mut self, delta: f64) -> f64 {
        self.animator.scroll(delta)
    }

    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.scene.resize(width, height)
    }

    /// Inputs the colour field consumes this frame.
    pub fn field_uniforms(&self) -> FieldUniforms {
        let state = self.animator.state();
        FieldUniforms {
            time: state.elapsed_time as f32,
            uv_offset: state.cyclic_offset as f32,
            light_position: self.scene.shading.light_position,
            light_color: self.scene.shading.light_color,
            fog: self.scene.fog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Viewport;

    #[test]
    fn tick_moves_camera_and_mesh() {
        let mut wormhole = Wormhole::new(Scene::new(Viewport::new(800, 600)), Default::default());
        wormhole.tick(ClockReading::new(1_000.0, 20_000.0));

        assert!((wormhole.scene().camera.roll - 2.0).abs() < 1e-6);
        assert!((wormhole.scene().mesh.spin_y - 0.001).abs() < 1e-9);
        let uniforms = wormhole.field_uniforms();
        assert!((uniforms.time - 9.0).abs() < 1e-6);
        assert!((uniforms.uv_offset - 0.005).abs() < 1e-9);
    }

    #[test]
    fn field_uniforms_start_at_initial_time() {
        let wormhole = Wormhole::new(Scene::new(Viewport::new(800, 600)), Default::default());
        let uniforms = wormhole.field_uniforms();
        assert_eq!(uniforms.time, 2.0);
        assert_eq!(uniforms.light_color, glam::Vec3::ZERO);
    }

    #[test]
    fn resize_and_scroll_delegate() {
        let mut wormhole = Wormhole::new(Scene::new(Viewport::new(800, 600)), Default::default());
        assert!(wormhole.resize(1024, 768));
        assert_eq!(wormhole.scene().viewport, Viewport::new(1024, 768));
        assert!((wormhole.scroll(1.0) - 0.05).abs() < 1e-12);
        assert!((wormhole.animation().cyclic_offset - 0.05).abs() < 1e-12);
    }
}
