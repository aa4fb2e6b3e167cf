use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec2, Vec3};

/// Orange used by every light in the scene, `rgb(226, 136, 0)`.
pub const LIGHT_ORANGE: Vec3 = Vec3::new(226.0 / 255.0, 136.0 / 255.0, 0.0);

/// Linear depth fog applied by the field shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogParameters {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl FogParameters {
    pub fn new(color: Vec3, near: f32, far: f32) -> Self {
        Self { color, near, far }
    }
}

impl Default for FogParameters {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0, 2000.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Directional { direction: Vec3 },
    Point { position: Vec3, distance: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightDescriptor {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
}

impl LightDescriptor {
    /// Directional light; the direction is normalised.
    pub fn directional(color: Vec3, intensity: f32, direction: Vec3) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional {
                direction: direction.normalize_or_zero(),
            },
        }
    }

    pub fn point(color: Vec3, intensity: f32, position: Vec3, distance: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { position, distance },
        }
    }
}

/// The four lights placed around the tunnel.
pub fn default_lights() -> [LightDescriptor; 4] {
    [
        LightDescriptor::directional(LIGHT_ORANGE, 0.0, Vec3::new(0.0, 1.0, 1.0)),
        LightDescriptor::directional(LIGHT_ORANGE, 0.0, Vec3::new(0.0, -1.0, 1.0)),
        LightDescriptor::point(LIGHT_ORANGE, 0.5, Vec3::new(0.0, -3.0, 0.0), 25.0),
        LightDescriptor::point(LIGHT_ORANGE, 0.0, Vec3::new(3.0, 3.0, 0.0), 30.0),
    ]
}

/// Light inputs of the field shader.
///
/// These are independent of the scene lights above and stay zero unless
/// configured, which switches the decorative lighting passes off.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShadingInputs {
    pub light_position: Vec3,
    pub light_color: Vec3,
}

/// Drawable size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resolution(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Right-handed perspective camera looking down -Z at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    /// Rotation about the view axis (radians).
    pub roll: f32,
}

impl PerspectiveCamera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: 40.0,
            aspect,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 10.0),
            roll: 0.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_z(self.roll), self.position).inverse()
    }

    /// Projection with a `[0, 1]` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect.max(1e-6),
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Orientation of the tunnel mesh: tipped onto the view axis, then spun.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTransform {
    pub tilt_x: f32,
    pub spin_y: f32,
}

impl MeshTransform {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.tilt_x) * Mat4::from_rotation_y(self.spin_y)
    }
}

impl Default for MeshTransform {
    fn default() -> Self {
        Self {
            tilt_x: FRAC_PI_2,
            spin_y: 0.0,
        }
    }
}

/// Everything drawn, minus the per-frame animation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub fog: FogParameters,
    pub lights: [LightDescriptor; 4],
    pub viewport: Viewport,
    pub shading: ShadingInputs,
    pub mesh: MeshTransform,
}

impl Scene {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            camera: PerspectiveCamera::new(viewport.aspect()),
            fog: FogParameters::default(),
            lights: default_lights(),
            viewport,
            shading: ShadingInputs::default(),
            mesh: MeshTransform::default(),
        }
    }

    pub fn with_fog(mut self, fog: FogParameters) -> Self {
        self.fog = fog;
        self
    }

    pub fn with_shading(mut self, shading: ShadingInputs) -> Self {
        self.shading = shading;
        self
    }

    /// Tracks a new drawable size. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring zero-sized viewport");
            return false;
        }
        self.viewport = Viewport::new(width, height);
        self.camera.aspect = self.viewport.aspect();
        true
    }
}

/// Result of the start-up check that the tunnel mesh and its shader are wired together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
    Linked,
    Incomplete,
}

/// Logs whether the mesh and its material both exist. Never fatal.
pub fn check_linkage(mesh_ready: bool, material_ready: bool) -> Linkage {
    if mesh_ready && material_ready {
        tracing::info!("cylinder mesh and wormhole shader are linked");
        Linkage::Linked
    } else {
        tracing::warn!(
            mesh_ready,
            material_ready,
            "cylinder mesh and wormhole shader linkage is incomplete"
        );
        Linkage::Incomplete
    }
}
