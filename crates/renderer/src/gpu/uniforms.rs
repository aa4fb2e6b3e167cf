use bytemuck::{Pod, Zeroable};
use tunnel::Wormhole;

/// CPU mirror of the `WormholeParams` std140 block.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct WormholeUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub time: f32,
    pub uv_offset: f32,
    pub light_position: [f32; 4],
    pub light_color: [f32; 4],
    pub fog_color: [f32; 4],
    pub fog_near: f32,
    pub fog_far: f32,
    pub padding: [f32; 2],
}

unsafe impl Zeroable for WormholeUniforms {}
unsafe impl Pod for WormholeUniforms {}

impl WormholeUniforms {
    /// Snapshot of everything the shaders read this frame.
    pub fn from_wormhole(wormhole: &Wormhole) -> Self {
        let scene = wormhole.scene();
        let field = wormhole.field_uniforms();
        Self {
            view_projection: scene.camera.view_projection().to_cols_array_2d(),
            model: scene.mesh.model_matrix().to_cols_array_2d(),
            resolution: scene.viewport.resolution().to_array(),
            time: field.time,
            uv_offset: field.uv_offset,
            light_position: field.light_position.extend(0.0).to_array(),
            light_color: field.light_color.extend(0.0).to_array(),
            fog_color: field.fog.color.extend(1.0).to_array(),
            fog_near: field.fog.near,
            fog_far: field.fog.far,
            padding: [0.0; 2],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::mem::{align_of, offset_of, size_of};

    use tunnel::{ClockReading, Scene, Viewport};

    use super::*;

    #[test]
    fn layout_matches_std140_block() {
        assert_eq!(size_of::<WormholeUniforms>(), 208);
        assert_eq!(align_of::<WormholeUniforms>(), 16);
        assert_eq!(offset_of!(WormholeUniforms, model), 64);
        assert_eq!(offset_of!(WormholeUniforms, resolution), 128);
        assert_eq!(offset_of!(WormholeUniforms, time), 136);
        assert_eq!(offset_of!(WormholeUniforms, uv_offset), 140);
        assert_eq!(offset_of!(WormholeUniforms, light_position), 144);
        assert_eq!(offset_of!(WormholeUniforms, fog_color), 176);
        assert_eq!(offset_of!(WormholeUniforms, fog_near), 192);
        assert_eq!(offset_of!(WormholeUniforms, padding), 200);
    }

    #[test]
    fn snapshot_reflects_wormhole_state() {
        let mut wormhole =
            Wormhole::new(Scene::new(Viewport::new(1024, 768)), Default::default());
        let initial = WormholeUniforms::from_wormhole(&wormhole);
        assert_eq!(initial.time, 2.0);
        assert_eq!(initial.resolution, [1024.0, 768.0]);
        assert_eq!(initial.fog_far, 2000.0);

        wormhole.tick(ClockReading::new(1_000.0, 0.0));
        let ticked = WormholeUniforms::from_wormhole(&wormhole);
        assert!((ticked.time - 9.0).abs() < 1e-6);
        assert!((ticked.uv_offset - 0.005).abs() < 1e-6);
        assert_ne!(ticked.model, initial.model);
        assert_eq!(bytemuck::bytes_of(&ticked).len(), 208);
    }
}
