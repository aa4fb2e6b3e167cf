//! CPU rendition of the wormhole colour field.
//!
//! This mirrors the fragment shader in `renderer::compile` operation for
//! operation, in `f32`, so that the numeric behaviour (including the
//! overflow-prone frequency growth) can be inspected and tested without a GPU.
//!
//! ```text
//!   uv ──fold──▶ p0 ──30× rotate/warp/accumulate──▶ a ──▶ base colour
//!                 │                                          │
//!                 └──▶ normal ──▶ diffuse / specular / gloss ┴──▶ fog ──▶ rgba
//! ```

use glam::{Vec2, Vec3, Vec4};
use serde::Serialize;

use crate::scene::FogParameters;

/// Number of noise octaves.
pub const ITERATIONS: u32 = 30;
/// Frequency of the first octave.
pub const INITIAL_SCALE: f32 = 20.0;
/// Frequency growth per octave.
pub const SCALE_GROWTH: f32 = 1.6;
/// Seed of the noise accumulator.
pub const ACCUMULATOR_SEED: f32 = 0.005;
/// Domain-warp rotation applied every octave (radians).
pub const WARP_ROTATION: f32 = 1.0;

const PALETTE: Vec3 = Vec3::new(10.0, 1.0, 1.0);
const AMBIENT: Vec3 = Vec3::new(1.0, 0.001, 0.2);
const SPECULAR_TINT: Vec3 = Vec3::new(1.0, 0.5, 0.5);
const GLOSS_TINT: Vec3 = Vec3::new(100.0, 100.0, 100.0);

/// Per-draw inputs shared by every sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldUniforms {
    pub time: f32,
    /// Carried alongside the other inputs; the colour math does not read it.
    pub uv_offset: f32,
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub fog: FogParameters,
}

impl Default for FieldUniforms {
    fn default() -> Self {
        Self {
            time: 2.0,
            uv_offset: 0.0,
            light_position: Vec3::ZERO,
            light_color: Vec3::ZERO,
            fog: FogParameters::default(),
        }
    }
}

/// One evaluation point on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Interpolated surface coordinate in `[0, 1]²`.
    pub uv: Vec2,
    /// Perspective depth, `gl_FragCoord.z / gl_FragCoord.w` on the GPU.
    pub view_depth: f32,
    /// Change of `uv` per horizontal screen step (`dFdx`).
    pub uv_dx: Vec2,
    /// Change of `uv` per vertical screen step (`dFdy`).
    pub uv_dy: Vec2,
}

impl SurfaceSample {
    /// Sample with screen-aligned, unit derivatives.
    pub fn new(uv: Vec2, view_depth: f32) -> Self {
        Self {
            uv,
            view_depth,
            uv_dx: Vec2::X,
            uv_dy: Vec2::Y,
        }
    }

    pub fn with_derivatives(mut self, uv_dx: Vec2, uv_dy: Vec2) -> Self {
        self.uv_dx = uv_dx;
        self.uv_dy = uv_dy;
        self
    }
}

/// Intermediate values of one evaluation, for diagnostics and export tooling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldTrace {
    pub folded: [f32; 2],
    pub radius_sq: f32,
    pub accumulator: f32,
    pub base_color: [f32; 3],
    pub normal: [f32; 3],
    pub fog_factor: f32,
    pub color: [f32; 4],
}

/// Folds the unit square into a mirrored, tileable coordinate.
///
/// `p = uv * 2; p = mix(p, 2 - p, step(1, p))`.
pub fn fold_uv(uv: Vec2) -> Vec2 {
    let doubled = uv * 2.0;
    Vec2::new(fold_component(doubled.x), fold_component(doubled.y))
}

fn fold_component(value: f32) -> f32 {
    let edge = step(1.0, value);
    mix_scalar(value, 2.0 - value, edge)
}

/// Row-vector product `v * mat2(c, s, -s, c)`, as GLSL evaluates `p *= m`.
fn warp(v: Vec2, cos_r: f32, sin_r: f32) -> Vec2 {
    Vec2::new(v.x * cos_r + v.y * sin_r, -v.x * sin_r + v.y * cos_r)
}

/// Layered sinusoidal noise with a rotating domain warp.
///
/// The octave frequency grows geometrically without any clamp, so the last
/// octaves run at extremely high frequency; whatever `f32` does there is the
/// intended result.
pub fn accumulate_noise(p0: Vec2, time: f32) -> f32 {
    let d = p0.dot(p0);
    let (sin_r, cos_r) = WARP_ROTATION.sin_cos();
    let weights = Vec2::splat(0.1);

    let mut p = p0;
    let mut n = Vec2::ZERO;
    let mut scale = INITIAL_SCALE;
    let mut a = ACCUMULATOR_SEED;

    for j in 0..ITERATIONS {
        let j = j as f32;
        p = warp(p, cos_r, sin_r);
        n = warp(n, cos_r, sin_r);
        let t = time * 0.05 + j * 0.05;
        let wobble = (t * 1.25 - d * 1.25).sin() * 2.5;
        let q = p * scale - Vec2::splat(t) + Vec2::splat(wobble) + Vec2::splat(j) + n;
        a += (cos_vec(q) / scale).dot(weights);
        n -= sin_vec(q);
        scale *= SCALE_GROWTH;
    }

    a
}

/// Red-dominant palette scaled by the accumulator and darkened by radius.
pub fn base_color(accumulator: f32, radius_sq: f32) -> Vec3 {
    PALETTE * (accumulator + 0.025) + Vec3::splat(accumulator) + Vec3::splat(accumulator)
        - Vec3::splat(0.05 * radius_sq)
}

/// Decorative normal from the screen derivatives of `(p0, 1)`.
///
/// Degenerate derivatives produce a NaN normal, as `normalize(vec3(0))` does
/// on the GPU.
pub fn surface_normal(sample: &SurfaceSample) -> Vec3 {
    let doubled = sample.uv * 2.0;
    // d(fold)/d(uv): +2 below the fold line, -2 above it.
    let jacobian = Vec2::new(
        mix_scalar(2.0, -2.0, step(1.0, doubled.x)),
        mix_scalar(2.0, -2.0, step(1.0, doubled.y)),
    );
    let ddx = (sample.uv_dx * jacobian).extend(0.0);
    let ddy = (sample.uv_dy * jacobian).extend(0.0);
    let cross = ddx.cross(ddy);
    cross / cross.length()
}

/// `smoothstep(near, far, depth)`.
pub fn fog_factor(fog: &FogParameters, depth: f32) -> f32 {
    smoothstep(fog.near, fog.far, depth)
}

/// Evaluates the full field and keeps every intermediate.
pub fn trace(sample: &SurfaceSample, uniforms: &FieldUniforms) -> FieldTrace {
    let p0 = fold_uv(sample.uv);
    let d = p0.dot(p0);
    let a = accumulate_noise(p0, uniforms.time);
    let base = base_color(a, d);

    let light = uniforms.light_position;
    let normal = surface_normal(sample);
    let diff = normal.dot(light).max(0.25);
    let diffuse = uniforms.light_color * diff;

    let view_dir = p0.extend(0.5).normalize();
    let reflect_dir = reflect(-light, normal);
    let spec = view_dir.dot(reflect_dir).max(0.25).powf(100.0);
    let specular = SPECULAR_TINT * spec;

    let mut col = mix_vec3(base, diffuse, 0.1) + specular + AMBIENT * 0.05;

    let gloss_view = Vec3::new(0.0, 0.0, -1.0);
    let gloss_normal = Vec3::ONE.normalize();
    let gloss_reflect = reflect(-light, gloss_normal);
    let gloss = gloss_view.dot(gloss_reflect).max(0.0).powf(1.0);
    col += GLOSS_TINT * gloss;

    let fog = fog_factor(&uniforms.fog, sample.view_depth);
    col = mix_vec3(col, uniforms.fog.color, fog);

    FieldTrace {
        folded: p0.to_array(),
        radius_sq: d,
        accumulator: a,
        base_color: base.to_array(),
        normal: normal.to_array(),
        fog_factor: fog,
        color: col.extend(1.0).to_array(),
    }
}

/// Colour of one surface sample. Alpha is always 1.
pub fn shade(sample: &SurfaceSample, uniforms: &FieldUniforms) -> Vec4 {
    Vec4::from_array(trace(sample, uniforms).color)
}

/// Evaluates the field at every pixel centre of a `width` × `height` grid.
///
/// Rows run top to bottom while `v` grows upwards, matching window space.
pub fn render_grid(
    width: u32,
    height: u32,
    uniforms: &FieldUniforms,
    view_depth: f32,
) -> Vec<Vec4> {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let uv_dx = Vec2::new(1.0 / w, 0.0);
    let uv_dy = Vec2::new(0.0, 1.0 / h);

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height {
        for column in 0..width {
            let uv = Vec2::new(
                (column as f32 + 0.5) / w,
                1.0 - (row as f32 + 0.5) / h,
            );
            let sample = SurfaceSample::new(uv, view_depth).with_derivatives(uv_dx, uv_dy);
            pixels.push(shade(&sample, uniforms));
        }
    }
    pixels
}

fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

fn mix_scalar(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

fn mix_vec3(x: Vec3, y: Vec3, a: f32) -> Vec3 {
    x * (1.0 - a) + y * a
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - normal * (2.0 * normal.dot(incident))
}

fn cos_vec(v: Vec2) -> Vec2 {
    Vec2::new(v.x.cos(), v.y.cos())
}

fn sin_vec(v: Vec2) -> Vec2 {
    Vec2::new(v.x.sin(), v.y.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn golden_uniforms() -> FieldUniforms {
        FieldUniforms {
            time: 0.0,
            uv_offset: 0.0,
            light_position: Vec3::new(0.0, 0.0, 1.0),
            light_color: Vec3::ONE,
            fog: FogParameters::new(Vec3::ZERO, 1.0, 2000.0),
        }
    }

    fn assert_close(actual: f32, expected: f32, tolerance: f32) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fold_mirrors_across_the_centre_line() {
        for &u in &[0.0_f32, 0.1, 0.25, 0.4, 0.5] {
            for &v in &[0.0_f32, 0.3, 0.5, 0.9] {
                let mirrored = fold_uv(Vec2::new(1.0 - u, v));
                let folded = fold_uv(Vec2::new(u, v));
                assert!((mirrored - folded).abs().max_element() < 1e-6);
            }
        }
        // The doubled coordinate folds about 1: remap(u) == remap(2 - u).
        for &x in &[1.0_f32, 1.2, 1.5, 1.75, 2.0] {
            assert_eq!(fold_component(x), fold_component(2.0 - x));
        }
        assert_eq!(fold_uv(Vec2::new(0.0, 1.0)), Vec2::new(0.0, 0.0));
        assert_eq!(fold_uv(Vec2::new(0.5, 0.5)), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn golden_centre_sample() {
        let uniforms = golden_uniforms();
        let sample = SurfaceSample::new(Vec2::new(0.5, 0.5), 0.0);
        let trace = trace(&sample, &uniforms);

        assert_eq!(trace.folded, [1.0, 1.0]);
        assert_eq!(trace.radius_sq, 2.0);
        assert_close(trace.accumulator, 0.005_405_93, 1e-5);
        assert_close(trace.base_color[0], 0.214_871_2, 1e-4);
        assert_close(trace.base_color[1], -0.058_782_2, 1e-4);
        assert_close(trace.base_color[2], -0.058_782_2, 1e-4);
        assert_eq!(trace.normal, [0.0, 0.0, 1.0]);
        assert_eq!(trace.fog_factor, 0.0);
        assert_close(trace.color[0], 33.676_72, 1e-3);
        assert_close(trace.color[1], 33.380_48, 1e-3);
        assert_close(trace.color[2], 33.390_43, 1e-3);
        assert_eq!(trace.color[3], 1.0);
    }

    #[test]
    fn golden_folded_samples() {
        let p0 = fold_uv(Vec2::new(0.25, 0.75));
        let a = accumulate_noise(p0, 2.0);
        assert_eq!(p0, Vec2::new(0.5, 0.5));
        assert_close(a, 0.002_240_05, 1e-5);
        assert_close(base_color(a, 0.5).x, 0.251_880_6, 1e-4);

        let p0 = fold_uv(Vec2::new(0.1, 0.3));
        let a = accumulate_noise(p0, 17.5);
        assert_close(a, 0.005_601_66, 1e-5);
        assert_close(base_color(a, p0.dot(p0)).y, 0.021_805, 1e-4);
    }

    #[test]
    fn shading_is_deterministic() {
        let uniforms = FieldUniforms {
            time: 123.456,
            uv_offset: 3.2,
            ..golden_uniforms()
        };
        let sample = SurfaceSample::new(Vec2::new(0.37, 0.81), 12.0);
        let first = shade(&sample, &uniforms);
        let second = shade(&sample, &uniforms);
        assert_eq!(first.to_array().map(f32::to_bits), second.to_array().map(f32::to_bits));
    }

    #[test]
    fn uv_offset_does_not_change_colour() {
        let sample = SurfaceSample::new(Vec2::new(0.2, 0.6), 5.0);
        let base = golden_uniforms();
        let shifted = FieldUniforms {
            uv_offset: 7.5,
            ..base
        };
        assert_eq!(shade(&sample, &base), shade(&sample, &shifted));
    }

    #[test]
    fn unbound_lights_leave_only_ambient_lighting() {
        let uniforms = FieldUniforms {
            time: 0.0,
            ..FieldUniforms::default()
        };
        let sample = SurfaceSample::new(Vec2::new(0.5, 0.5), 0.0);
        let trace = trace(&sample, &uniforms);
        let base = Vec3::from_array(trace.base_color);
        let expected = base * 0.9 + AMBIENT * 0.05;
        assert!((Vec3::new(trace.color[0], trace.color[1], trace.color[2]) - expected)
            .abs()
            .max_element()
            < 1e-6);
    }

    #[test]
    fn fog_blends_towards_fog_colour_with_depth() {
        let fog = FogParameters::new(Vec3::new(0.2, 0.4, 0.6), 1.0, 2000.0);
        assert_eq!(fog_factor(&fog, 0.5), 0.0);
        assert_eq!(fog_factor(&fog, 2500.0), 1.0);
        assert_close(fog_factor(&fog, 1000.5), 0.5, 1e-6);

        let uniforms = FieldUniforms {
            fog,
            ..golden_uniforms()
        };
        let far = shade(&SurfaceSample::new(Vec2::new(0.3, 0.3), 4000.0), &uniforms);
        assert_eq!(far.truncate(), fog.color);
        assert_eq!(far.w, 1.0);
    }

    #[test]
    fn normal_follows_fold_orientation() {
        let below = SurfaceSample::new(Vec2::new(0.2, 0.2), 0.0);
        let straddling = SurfaceSample::new(Vec2::new(0.7, 0.2), 0.0);
        assert_eq!(surface_normal(&below), Vec3::Z);
        assert_eq!(surface_normal(&straddling), -Vec3::Z);

        let degenerate = below.with_derivatives(Vec2::ZERO, Vec2::Y);
        assert!(surface_normal(&degenerate).is_nan());
    }

    #[test]
    fn grid_covers_every_pixel() {
        let uniforms = FieldUniforms {
            time: 0.0,
            ..FieldUniforms::default()
        };
        let pixels = render_grid(8, 4, &uniforms, 0.0);
        assert_eq!(pixels.len(), 32);
        assert!(pixels.iter().all(|pixel| pixel.w == 1.0));
        // Columns 0 and 7 fold onto the same point; with unbound lights the
        // flipped normal has no effect.
        assert_eq!(pixels[0].truncate(), pixels[7].truncate());
    }

    #[test]
    fn trace_serialises_intermediates() {
        let trace = trace(&SurfaceSample::new(Vec2::new(0.5, 0.5), 0.0), &golden_uniforms());
        let json = serde_json::to_value(trace).unwrap();
        assert_eq!(json["folded"], serde_json::json!([1.0, 1.0]));
        assert_eq!(json["radius_sq"], serde_json::json!(2.0));
        assert_eq!(json["color"].as_array().unwrap().len(), 4);
    }
}
