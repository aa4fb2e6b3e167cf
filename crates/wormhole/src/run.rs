use std::path::PathBuf;

use anyhow::{Context, Result};
use renderer::{Antialiasing, ColorSpaceMode, Renderer, RendererConfig};
use tracing_subscriber::EnvFilter;
use wormconfig::{AntialiasSetting, ColorSpaceSetting, WormholeConfig};

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub fn run(args: RunArgs) -> Result<()> {
    let config_path = resolve_config_path(&args)?;
    let file_config = WormholeConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "configuration resolved");

    renderer::check_shaders().context("embedded shaders failed validation")?;

    let config = build_renderer_config(&args, &file_config);
    Renderer::new(config).run()
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_config_path(args: &RunArgs) -> Result<PathBuf> {
    match &args.config {
        Some(path) => Ok(path.clone()),
        None => Ok(AppPaths::discover()?.config_file()),
    }
}

/// Merges the configuration file with command-line overrides.
///
/// Flags win over the file; the file wins over built-in defaults.
pub fn build_renderer_config(args: &RunArgs, file: &WormholeConfig) -> RendererConfig {
    let window = &file.window;
    let surface_size = args.size.unwrap_or((window.width, window.height));
    let target_fps = args
        .fps
        .or(window.fps)
        .filter(|fps| fps.is_finite() && *fps > 0.0);
    let antialiasing = args
        .antialias
        .or_else(|| window.antialias.map(antialiasing_from_setting))
        .unwrap_or_default();
    let color_space = args
        .color_space
        .unwrap_or_else(|| color_space_from_setting(window.color_space));

    RendererConfig {
        surface_size,
        title: window.title.clone(),
        target_fps,
        antialiasing,
        color_space,
        exit_after: args.exit_after.or(window.exit_after),
        tunables: file.tunables(),
        fog: file.fog(),
        shading: file.shading(),
    }
}

fn antialiasing_from_setting(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

fn color_space_from_setting(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}
