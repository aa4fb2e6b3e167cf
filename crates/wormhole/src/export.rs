//! CPU renditions of the colour field for inspection without a GPU.

use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use tunnel::{render_grid, trace, FieldTrace, FieldUniforms, SurfaceSample};

use crate::cli::{ExportArgs, SampleArgs};

pub fn sample(args: &SampleArgs) -> FieldTrace {
    let uniforms = FieldUniforms {
        time: args.time,
        light_position: args.light_position.map(Vec3::from).unwrap_or(Vec3::ZERO),
        light_color: args.light_color.map(Vec3::from).unwrap_or(Vec3::ZERO),
        ..FieldUniforms::default()
    };
    let sample = SurfaceSample::new(Vec2::from(args.uv), args.depth);
    trace(&sample, &uniforms)
}

pub fn print_sample(args: &SampleArgs) -> Result<()> {
    let result = sample(args);
    let json = serde_json::to_string_pretty(&result).context("failed to encode sample")?;
    println!("{json}");
    Ok(())
}

pub fn export_png(args: &ExportArgs) -> Result<()> {
    let (width, height) = args.size;
    let uniforms = FieldUniforms {
        time: args.time,
        ..FieldUniforms::default()
    };
    tracing::info!(width, height, time = args.time, "rendering field on the CPU");

    let pixels = render_grid(width, height, &uniforms, args.depth);
    let image = to_image(width, height, &pixels);
    image
        .save(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    tracing::info!(path = %args.out.display(), "export complete");
    Ok(())
}

fn to_image(width: u32, height: u32, pixels: &[Vec4]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let index = (y * width + x) as usize;
        let color = pixels.get(index).copied().unwrap_or(Vec4::W);
        Rgba(color.to_array().map(to_byte))
    })
}

/// Clamps a colour channel to `[0, 1]` and quantises it.
fn to_byte(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_args(uv: [f32; 2], time: f32) -> SampleArgs {
        SampleArgs {
            uv,
            time,
            depth: 10.0,
            light_position: None,
            light_color: None,
        }
    }

    #[test]
    fn sample_matches_field_trace() {
        let result = sample(&sample_args([0.5, 0.5], 0.0));
        assert!((result.accumulator - 0.005_405_93).abs() < 1e-5);
        assert_eq!(result.color[3], 1.0);
    }

    #[test]
    fn sample_is_deterministic() {
        let args = sample_args([0.3, 0.7], 2.5);
        assert_eq!(sample(&args), sample(&args));
    }

    #[test]
    fn channels_clamp_to_bytes() {
        assert_eq!(to_byte(-1.0), 0);
        assert_eq!(to_byte(0.5), 128);
        assert_eq!(to_byte(33.0), 255);
        assert_eq!(to_byte(f32::NAN), 0);
    }

    #[test]
    fn export_writes_png() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/frame.png");
        ensure_parent(&out).unwrap();
        export_png(&ExportArgs {
            out: out.clone(),
            size: (16, 8),
            time: 2.0,
            depth: 10.0,
        })
        .unwrap();

        let image = image::open(&out).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (16, 8));
        assert_eq!(image.get_pixel(0, 0)[3], 255);
    }
}
