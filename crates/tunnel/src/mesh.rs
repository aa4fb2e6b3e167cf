use std::f32::consts::TAU;

/// Dimensions of an open-ended cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSpec {
    pub radius: f32,
    pub height: f32,
    pub radial_segments: u16,
    pub height_segments: u16,
}

impl Default for CylinderSpec {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height: 20.0,
            radial_segments: 30,
            height_segments: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle list for the tunnel wall.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl CylinderMesh {
    /// Builds the side wall only; no caps are generated.
    ///
    /// Rows run from the top (`+height/2`, `v = 1`) to the bottom. The seam
    /// column is duplicated so the texture coordinate can reach `u = 1`.
    pub fn new(spec: CylinderSpec) -> Self {
        let columns = usize::from(spec.radial_segments) + 1;
        let rows = usize::from(spec.height_segments) + 1;
        let half_height = spec.height / 2.0;

        let mut vertices = Vec::with_capacity(columns * rows);
        for y in 0..rows {
            let v = y as f32 / f32::from(spec.height_segments);
            for x in 0..columns {
                let u = x as f32 / f32::from(spec.radial_segments);
                let theta = u * TAU;
                let (sin_t, cos_t) = theta.sin_cos();
                vertices.push(MeshVertex {
                    position: [
                        spec.radius * sin_t,
                        -v * spec.height + half_height,
                        spec.radius * cos_t,
                    ],
                    uv: [u, 1.0 - v],
                });
            }
        }

        let index_at = |x: u16, y: u16| y * (spec.radial_segments + 1) + x;
        let mut indices = Vec::with_capacity(
            usize::from(spec.radial_segments) * usize::from(spec.height_segments) * 6,
        );
        for x in 0..spec.radial_segments {
            for y in 0..spec.height_segments {
                let a = index_at(x, y);
                let b = index_at(x, y + 1);
                let c = index_at(x + 1, y + 1);
                let d = index_at(x + 1, y);
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

impl Default for CylinderMesh {
    fn default() -> Self {
        Self::new(CylinderSpec::default())
    }
}
