use std::borrow::Cow;

use wgpu::naga;
use wgpu::naga::ShaderStage;

/// Shader stage failures. Any of these aborts start-up.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("{stage} shader failed to parse:\n{message}")]
    Parse { stage: &'static str, message: String },
    #[error("{stage} shader failed validation:\n{message}")]
    Validation { stage: &'static str, message: String },
    #[error("device rejected {stage} shader module: {message}")]
    Device { stage: &'static str, message: String },
}

fn stage_name(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "vertex",
        ShaderStage::Fragment => "fragment",
        _ => "compute",
    }
}

/// Parses and validates GLSL with naga before anything reaches the device.
pub fn validate_glsl(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderError> {
    let name = stage_name(stage);
    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&naga::front::glsl::Options::from(stage), source)
        .map_err(|err| ShaderError::Parse {
            stage: name,
            message: err.to_string(),
        })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| ShaderError::Validation {
        stage: name,
        message: err.to_string(),
    })?;

    Ok(module)
}

/// Validates then uploads one stage, inside a validation error scope.
pub(crate) fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: String,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let name = stage_name(stage);
    validate_glsl(stage, &source)?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(name),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(ShaderError::Device {
            stage: name,
            message: err.to_string(),
        });
    }
    tracing::debug!(stage = name, "compiled shader module");
    Ok(module)
}

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, ShaderError> {
    compile_stage(device, ShaderStage::Vertex, vertex_source())
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
) -> Result<wgpu::ShaderModule, ShaderError> {
    compile_stage(device, ShaderStage::Fragment, fragment_source())
}

pub fn vertex_source() -> String {
    format!("{VERSION}{UNIFORM_BLOCK}{VERTEX_BODY}")
}

pub fn fragment_source() -> String {
    format!("{VERSION}{UNIFORM_BLOCK}{FRAGMENT_BODY}")
}

const VERSION: &str = "#version 450\n";

/// Uniform block shared by both stages.
///
/// The layout must match `WormholeUniforms` in `gpu/uniforms.rs` (std140, 208 bytes).
/// `uv_offset` is uploaded every frame but not read by the colour math.
const UNIFORM_BLOCK: &str = r"
layout(std140, set = 0, binding = 0) uniform WormholeParams {
    mat4 view_projection;
    mat4 model;
    vec2 resolution;
    float time;
    float uv_offset;
    vec4 light_position;
    vec4 light_color;
    vec4 fog_color;
    float fog_near;
    float fog_far;
    vec2 _padding;
} params;
";

const VERTEX_BODY: &str = r"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = a_uv;
    gl_Position = params.view_projection * params.model * vec4(a_position, 1.0);
}
";

const FRAGMENT_BODY: &str = r"
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

mat2 rotate2d(float angle) {
    float c = cos(angle);
    float s = sin(angle);
    return mat2(c, s, -s, c);
}

void main() {
    vec2 p0 = v_uv * 2.0;
    p0 = mix(p0, vec2(2.0) - p0, step(vec2(1.0), p0));
    float d = dot(p0, p0);

    float a = 0.005;
    vec2 n = vec2(0.0);
    float S = 20.0;
    mat2 m = rotate2d(1.0);
    vec2 p = p0;
    for (int j = 0; j < 30; j++) {
        float fj = float(j);
        p *= m;
        n *= m;
        float t = params.time * 0.05 + fj * 0.05;
        vec2 q = p * S - vec2(t) + vec2(sin(t * 1.25 - d * 1.25) * 2.5) + vec2(fj) + n;
        a += dot(cos(q) / S, vec2(0.1));
        n -= sin(q);
        S *= 1.6;
    }

    vec3 col = vec3(10.0, 1.0, 1.0) * (a + 0.025) + vec3(a) + vec3(a) - vec3(0.05 * d);

    // Framebuffer y grows downwards here; flip so the normal faces the viewer.
    vec3 surface = vec3(p0, 1.0);
    vec3 normal = normalize(cross(dFdx(surface), -dFdy(surface)));
    vec3 light = params.light_position.xyz;

    float diff = max(dot(normal, light), 0.25);
    vec3 diffuse = params.light_color.rgb * diff;

    vec3 view_dir = normalize(vec3(p0, 0.5));
    vec3 reflect_dir = reflect(-light, normal);
    float spec = pow(max(dot(view_dir, reflect_dir), 0.25), 100.0);
    vec3 specular = vec3(1.0, 0.5, 0.5) * spec;

    col = mix(col, diffuse, 0.1) + specular + vec3(1.0, 0.001, 0.2) * 0.05;

    vec3 gloss_view = vec3(0.0, 0.0, -1.0);
    vec3 gloss_normal = normalize(vec3(1.0));
    vec3 gloss_reflect = reflect(-light, gloss_normal);
    float gloss = pow(max(dot(gloss_view, gloss_reflect), 0.0), 1.0);
    col += vec3(100.0) * gloss;

    float depth = gl_FragCoord.z / gl_FragCoord.w;
    float fog_factor = smoothstep(params.fog_near, params.fog_far, depth);
    col = mix(col, params.fog_color.rgb, fog_factor);

    out_color = vec4(col, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_shader_validates() {
        let module = validate_glsl(ShaderStage::Vertex, &vertex_source()).expect("vertex shader");
        assert!(module.entry_points.iter().any(|entry| entry.name == "main"));
    }

    #[test]
    fn fragment_shader_validates() {
        let module =
            validate_glsl(ShaderStage::Fragment, &fragment_source()).expect("fragment shader");
        assert!(module.entry_points.iter().any(|entry| entry.name == "main"));
    }

    #[test]
    fn both_stages_share_the_uniform_block() {
        assert!(vertex_source().contains(UNIFORM_BLOCK));
        assert!(fragment_source().contains(UNIFORM_BLOCK));
    }

    #[test]
    fn broken_source_reports_parse_error() {
        let err = validate_glsl(ShaderStage::Fragment, "#version 450\nvoid main() { nope }")
            .unwrap_err();
        assert!(matches!(err, ShaderError::Parse { stage: "fragment", .. }));
        assert!(err.to_string().contains("fragment shader failed to parse"));
    }
}
