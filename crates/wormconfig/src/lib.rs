use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use tunnel::animation::{self, AnimationTunables};
use tunnel::{FogParameters, ShadingInputs};

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "wormhole.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WormholeConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub animation: AnimationSection,
    #[serde(default)]
    pub fog: FogSection,
    #[serde(default)]
    pub shading: ShadingSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Frame cap; `0` or absent renders on every redraw.
    pub fps: Option<f32>,
    #[serde(deserialize_with = "deserialize_antialias_opt")]
    pub antialias: Option<AntialiasSetting>,
    pub color_space: ColorSpaceSetting,
    #[serde(
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_after: Option<Duration>,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Wormhole".into(),
            fps: None,
            antialias: None,
            color_space: ColorSpaceSetting::Auto,
            exit_after: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    /// MSAA sample count, or `None` for automatic selection.
    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimationSection {
    pub normal_speed: f64,
    pub speed_multiplier: f64,
    pub rotation_step: f64,
    pub camera_roll_rate: f64,
    pub time_scale: f64,
    pub scroll_step: f64,
    pub offset_modulus: f64,
}

impl Default for AnimationSection {
    fn default() -> Self {
        Self {
            normal_speed: animation::NORMAL_SPEED,
            speed_multiplier: animation::SPEED_MULTIPLIER,
            rotation_step: animation::ROTATION_STEP,
            camera_roll_rate: animation::CAMERA_ROLL_RATE,
            time_scale: animation::TIME_SCALE,
            scroll_step: animation::SCROLL_STEP,
            offset_modulus: animation::OFFSET_MODULUS,
        }
    }
}

impl From<&AnimationSection> for AnimationTunables {
    fn from(section: &AnimationSection) -> Self {
        AnimationTunables {
            normal_speed: section.normal_speed,
            speed_multiplier: section.speed_multiplier,
            rotation_step: section.rotation_step,
            camera_roll_rate: section.camera_roll_rate,
            time_scale: section.time_scale,
            scroll_step: section.scroll_step,
            offset_modulus: section.offset_modulus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FogSection {
    pub color: [f32; 3],
    pub near: f32,
    pub far: f32,
}

impl Default for FogSection {
    fn default() -> Self {
        let fog = FogParameters::default();
        Self {
            color: fog.color.to_array(),
            near: fog.near,
            far: fog.far,
        }
    }
}

impl From<&FogSection> for FogParameters {
    fn from(section: &FogSection) -> Self {
        FogParameters::new(section.color.into(), section.near, section.far)
    }
}

/// Light inputs of the colour field. Both default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ShadingSection {
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
}

impl From<&ShadingSection> for ShadingInputs {
    fn from(section: &ShadingSection) -> Self {
        ShadingInputs {
            light_position: section.light_position.into(),
            light_color: section.light_color.into(),
        }
    }
}

fn default_version() -> u32 {
    1
}

impl Default for WormholeConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            window: WindowSection::default(),
            animation: AnimationSection::default(),
            fog: FogSection::default(),
            shading: ShadingSection::default(),
        }
    }
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => serializer.serialize_str(&humantime::format_duration(*duration).to_string()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs_f64(v)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            let raw = value.to_string();
            Some(parse_antialias(&raw).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off` or a sample count (`2`, `4`, `8`, `16`).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" | "samples2" => Ok(AntialiasSetting::Samples2),
        "4" | "samples4" => Ok(AntialiasSetting::Samples4),
        "8" | "samples8" => Ok(AntialiasSetting::Samples8),
        "16" | "samples16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!("invalid antialias setting '{other}'")),
    }
}

impl WormholeConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: WormholeConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn tunables(&self) -> AnimationTunables {
        AnimationTunables::from(&self.animation)
    }

    pub fn fog(&self) -> FogParameters {
        FogParameters::from(&self.fog)
    }

    pub fn shading(&self) -> ShadingInputs {
        ShadingInputs::from(&self.shading)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if let Some(fps) = self.window.fps {
            if fps.is_nan() || fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if let Some(exit_after) = self.window.exit_after {
            if exit_after.is_zero() {
                return Err(ConfigError::Invalid(
                    "window.exit_after must be greater than zero".into(),
                ));
            }
        }

        let animation = &self.animation;
        if animation.offset_modulus.is_nan() || animation.offset_modulus <= 0.0 {
            return Err(ConfigError::Invalid(
                "animation.offset_modulus must be greater than zero".into(),
            ));
        }
        for (name, value) in [
            ("normal_speed", animation.normal_speed),
            ("speed_multiplier", animation.speed_multiplier),
            ("rotation_step", animation.rotation_step),
            ("camera_roll_rate", animation.camera_roll_rate),
            ("time_scale", animation.time_scale),
            ("scroll_step", animation.scroll_step),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "animation.{name} must be a finite number"
                )));
            }
        }

        if self.fog.near.is_nan() || self.fog.far.is_nan() || self.fog.near >= self.fog.far {
            return Err(ConfigError::Invalid(format!(
                "fog.near ({}) must be less than fog.far ({})",
                self.fog.near, self.fog.far
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
version = 1

[window]
width = 1024
height = 768
title = "tunnel"
fps = 30
antialias = 4
color_space = "linear"
exit_after = "2s"

[animation]
normal_speed = 0.01
scroll_step = 0.1

[fog]
color = [0.1, 0.0, 0.2]
near = 2.0
far = 500.0

[shading]
light_position = [0.0, 0.0, 1.0]
light_color = [1.0, 1.0, 1.0]
"#;

    #[test]
    fn parses_sample_config() {
        let config = WormholeConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.fps, Some(30.0));
        assert_eq!(config.window.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(config.window.color_space, ColorSpaceSetting::Linear);
        assert_eq!(config.window.exit_after, Some(Duration::from_secs(2)));

        let tunables = config.tunables();
        assert_eq!(tunables.normal_speed, 0.01);
        assert_eq!(tunables.scroll_step, 0.1);
        assert_eq!(tunables.offset_modulus, animation::OFFSET_MODULUS);

        assert_eq!(config.fog().far, 500.0);
        assert_eq!(config.shading().light_color.to_array(), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = WormholeConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, WormholeConfig::default());
        assert_eq!(config.tunables(), AnimationTunables::default());
        assert_eq!(config.fog(), FogParameters::default());
        assert_eq!(config.shading(), ShadingInputs::default());
    }

    #[test]
    fn rejects_unknown_version() {
        let err = WormholeConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_fog_range() {
        let err = WormholeConfig::from_toml_str(
            r#"
[fog]
near = 10.0
far = 5.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_modulus() {
        let err = WormholeConfig::from_toml_str(
            r#"
[animation]
offset_modulus = 0.0
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_antialias() {
        let err = WormholeConfig::from_toml_str(
            r#"
[window]
antialias = "3"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_round_trips_through_toml() {
        let mut config = WormholeConfig::default();
        config.window.exit_after = Some(Duration::from_millis(1500));
        let text = config.to_toml_string().expect("serialise");
        let parsed = WormholeConfig::from_toml_str(&text).expect("parse serialised");
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = WormholeConfig::load(&dir.path().join(CONFIG_FILE_NAME)).expect("load");
        assert_eq!(config, WormholeConfig::default());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).expect("create config");
        file.write_all(SAMPLE.as_bytes()).expect("write config");

        let config = WormholeConfig::load(&path).expect("load");
        assert_eq!(config.window.title, "tunnel");
    }
}
