use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use renderer::{Antialiasing, ColorSpaceMode};

#[derive(Parser, Debug)]
#[command(
    name = "wormhole",
    author,
    version,
    about = "Animated wormhole tunnel",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Configuration file; defaults to `wormhole.toml` in the config directory.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0=uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Close the window automatically after this long (e.g. `30s`, `2m`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub exit_after: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Evaluate the colour field at one surface point and print the result as JSON.
    Sample(SampleArgs),
    /// Render the colour field on the CPU and write it to a PNG.
    Export(ExportArgs),
    /// Inspect the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Surface coordinate as `U,V`.
    #[arg(long, value_name = "U,V", value_parser = parse_uv)]
    pub uv: [f32; 2],

    /// Field time (the animation starts at 2.0).
    #[arg(long, default_value_t = 2.0)]
    pub time: f32,

    /// View depth used for fog.
    #[arg(long, default_value_t = 10.0)]
    pub depth: f32,

    #[arg(long, value_name = "X,Y,Z", value_parser = parse_vec3, allow_hyphen_values = true)]
    pub light_position: Option<[f32; 3]>,

    #[arg(long, value_name = "R,G,B", value_parser = parse_vec3)]
    pub light_color: Option<[f32; 3]>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Destination PNG.
    #[arg(long, value_name = "PATH", value_parser = parse_png_path)]
    pub out: PathBuf,

    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, default_value = "512x512")]
    pub size: (u32, u32),

    #[arg(long, default_value_t = 2.0)]
    pub time: f32,

    #[arg(long, default_value_t = 10.0)]
    pub depth: f32,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Print the default configuration as TOML.
    Default,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let setting = wormconfig::parse_antialias(trimmed)?;
    Ok(match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    })
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", width.trim()))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", height.trim()))?;

    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let duration = humantime::parse_duration(value.trim()).map_err(|err| err.to_string())?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

pub fn parse_uv(value: &str) -> Result<[f32; 2], String> {
    let components = parse_components(value, 2)?;
    if components.iter().any(|c| !(0.0..=1.0).contains(c)) {
        return Err("uv components must lie in [0, 1]".to_string());
    }
    Ok([components[0], components[1]])
}

pub fn parse_vec3(value: &str) -> Result<[f32; 3], String> {
    let components = parse_components(value, 3)?;
    Ok([components[0], components[1], components[2]])
}

pub fn parse_png_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(path),
        None => Err("export path has no extension; expected .png".to_string()),
        Some(other) => Err(format!(
            "unsupported export format '.{other}'; expected .png"
        )),
    }
}

fn parse_components(value: &str, expected: usize) -> Result<Vec<f32>, String> {
    let components = value
        .split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<f32>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or_else(|| format!("invalid number '{part}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if components.len() != expected {
        return Err(format!(
            "expected {expected} comma-separated values, got {}",
            components.len()
        ));
    }
    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_accepts_known_modes() {
        assert_eq!(parse_antialias("auto").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias("OFF").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("8").unwrap(), Antialiasing::Samples(8));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias(" ").is_err());
    }

    #[test]
    fn color_space_aliases() {
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_color_space("Gamma").unwrap(), ColorSpaceMode::Gamma);
        assert!(parse_color_space("hdr").is_err());
    }

    #[test]
    fn size_parsing() {
        assert_eq!(parse_size("800x600").unwrap(), (800, 600));
        assert_eq!(parse_size(" 1024 X 768 ").unwrap(), (1024, 768));
        assert!(parse_size("0x600").is_err());
        assert!(parse_size("800").is_err());
    }

    #[test]
    fn components_and_ranges() {
        assert_eq!(parse_uv("0.5, 0.25").unwrap(), [0.5, 0.25]);
        assert!(parse_uv("1.5,0").is_err());
        assert!(parse_uv("0.5").is_err());
        assert_eq!(parse_vec3("-1,2,3.5").unwrap(), [-1.0, 2.0, 3.5]);
        assert!(parse_vec3("1,2,nan").is_err());
    }

    #[test]
    fn durations_must_be_positive() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn export_path_requires_png() {
        assert!(parse_png_path("frame.PNG").is_ok());
        assert!(parse_png_path("frame.exr").is_err());
        assert!(parse_png_path("frame").is_err());
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "wormhole",
            "sample",
            "--uv",
            "0.5,0.5",
            "--light-position",
            "-1,0,1",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Sample(args)) => {
                assert_eq!(args.uv, [0.5, 0.5]);
                assert_eq!(args.time, 2.0);
                assert_eq!(args.light_position, Some([-1.0, 0.0, 1.0]));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from(["wormhole", "--size", "640x480", "--fps", "30"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.size, Some((640, 480)));
        assert_eq!(cli.run.fps, Some(30.0));
        assert!(cli.run.antialias.is_none());
    }
}
