//! Setup-time configuration: canvas size, ray fan, emitter placement and the
//! obstacle layout, with optional overrides from `RAYCAST_*` environment
//! variables.

use glam::Vec2;
use std::str::FromStr;

use crate::emitter::{MAX_RAYS, RayFan};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;
pub const DEFAULT_EMITTER_RADIUS: f32 = 20.0;

// (ax, ay, bx, by)
const DEFAULT_LAYOUT: [[f32; 4]; 15] = [
    [100.0, 50.0, 400.0, 70.0],
    [300.0, 140.0, 120.0, 140.0],
    [400.0, 400.0, 600.0, 300.0],
    [200.0, 300.0, 200.0, 500.0],
    [700.0, 100.0, 700.0, 300.0],
    [500.0, 500.0, 600.0, 600.0],
    [50.0, 500.0, 250.0, 400.0],
    [10.0, 200.0, 90.0, 100.0],
    [20.0, 50.0, 40.0, 60.0],
    [45.0, 60.0, 40.0, 260.0],
    [230.0, 120.0, 130.0, 90.0],
    [400.0, 200.0, 400.0, 230.0],
    [400.0, 240.0, 400.0, 270.0],
    [400.0, 280.0, 400.0, 310.0],
    [400.0, 320.0, 400.0, 350.0],
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
    #[error("canvas size must be non-zero, got {width}x{height}")]
    EmptyCanvas { width: u32, height: u32 },
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("ray fan needs {count} rays, at most {} allowed", MAX_RAYS)]
    TooManyRays { count: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub fan: RayFan,
    pub emitter_position: Vec2,
    pub emitter_radius: f32,
    pub segments: Vec<[Vec2; 2]>,
    /// Seed for the obstacle colors; random when absent.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fan: RayFan::default(),
            emitter_position: Vec2::new(70.0, DEFAULT_HEIGHT as f32 / 2.0 + 230.0),
            emitter_radius: DEFAULT_EMITTER_RADIUS,
            segments: DEFAULT_LAYOUT
                .iter()
                .map(|&[ax, ay, bx, by]| [Vec2::new(ax, ay), Vec2::new(bx, by)])
                .collect(),
            seed: None,
        }
    }
}

impl Config {
    /// Build the config from the process environment.
    ///
    /// Optional:
    /// - `RAYCAST_WIDTH`, `RAYCAST_HEIGHT`: canvas size in pixels
    /// - `RAYCAST_FOV`, `RAYCAST_STEP`, `RAYCAST_HEADING`: ray fan in degrees
    /// - `RAYCAST_EMITTER_X`, `RAYCAST_EMITTER_Y`, `RAYCAST_EMITTER_RADIUS`
    /// - `RAYCAST_SEED`: obstacle color seed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_with(&lookup, "RAYCAST_WIDTH", &mut config.width)?;
        override_with(&lookup, "RAYCAST_HEIGHT", &mut config.height)?;
        override_with(&lookup, "RAYCAST_FOV", &mut config.fan.fov)?;
        override_with(&lookup, "RAYCAST_STEP", &mut config.fan.step)?;
        override_with(&lookup, "RAYCAST_HEADING", &mut config.fan.heading)?;
        override_with(&lookup, "RAYCAST_EMITTER_X", &mut config.emitter_position.x)?;
        override_with(&lookup, "RAYCAST_EMITTER_Y", &mut config.emitter_position.y)?;
        override_with(&lookup, "RAYCAST_EMITTER_RADIUS", &mut config.emitter_radius)?;

        if let Some(raw) = lookup("RAYCAST_SEED") {
            config.seed = Some(parse_var("RAYCAST_SEED", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyCanvas {
                width: self.width,
                height: self.height,
            });
        }

        self.fan.validate()?;
        require_positive("emitter radius", self.emitter_radius)?;
        require_finite("emitter x", self.emitter_position.x)?;
        require_finite("emitter y", self.emitter_position.y)?;

        for [a, b] in &self.segments {
            for value in [a.x, a.y, b.x, b.y] {
                require_finite("segment coordinate", value)?;
            }
        }

        Ok(())
    }
}

pub(crate) fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn require_finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn override_with<F, T>(lookup: &F, var: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(var) {
        *target = parse_var(var, &raw)?;
    }
    Ok(())
}

fn parse_var<T: FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = Config::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(
            config.fan,
            RayFan {
                fov: 360.0,
                step: 0.5,
                heading: 0.0
            }
        );
        assert_eq!(config.emitter_position, Vec2::new(70.0, 530.0));
        assert_eq!(config.emitter_radius, 20.0);
        assert_eq!(config.segments.len(), 15);
        assert_eq!(
            config.segments[9],
            [Vec2::new(45.0, 60.0), Vec2::new(40.0, 260.0)]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn lookup_overrides_fields() {
        let config = Config::from_lookup(lookup_from(&[
            ("RAYCAST_WIDTH", "1024"),
            ("RAYCAST_FOV", "90"),
            ("RAYCAST_STEP", " 1.5 "),
            ("RAYCAST_HEADING", "-45"),
            ("RAYCAST_EMITTER_X", "12.5"),
            ("RAYCAST_EMITTER_RADIUS", "8"),
            ("RAYCAST_SEED", "42"),
        ]))
        .unwrap();

        assert_eq!(config.width, 1024);
        assert_eq!(config.height, DEFAULT_HEIGHT);
        assert_eq!(
            config.fan,
            RayFan {
                fov: 90.0,
                step: 1.5,
                heading: -45.0
            }
        );
        assert_eq!(config.emitter_position.x, 12.5);
        assert_eq!(config.emitter_radius, 8.0);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn unparsable_value_is_reported() {
        let err = Config::from_lookup(lookup_from(&[("RAYCAST_STEP", "fast")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: "RAYCAST_STEP".into(),
                value: "fast".into()
            }
        );
        assert_eq!(err.to_string(), "invalid value for RAYCAST_STEP: \"fast\"");
    }

    #[test]
    fn non_positive_parameters_are_rejected() {
        for (var, value) in [
            ("RAYCAST_STEP", "0"),
            ("RAYCAST_STEP", "-0.5"),
            ("RAYCAST_FOV", "0"),
            ("RAYCAST_EMITTER_RADIUS", "0"),
            ("RAYCAST_EMITTER_RADIUS", "-3"),
            ("RAYCAST_FOV", "inf"),
        ] {
            let err = Config::from_lookup(lookup_from(&[(var, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::NotPositive { .. }),
                "{var}={value} gave {err:?}"
            );
        }
    }

    #[test]
    fn oversized_fan_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("RAYCAST_STEP", "1e-6")])).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyRays { .. }), "{err:?}");

        let err = Config::from_lookup(lookup_from(&[
            ("RAYCAST_FOV", "3e38"),
            ("RAYCAST_STEP", "1e-38"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::TooManyRays { .. }), "{err:?}");
    }

    #[test]
    fn zero_canvas_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("RAYCAST_HEIGHT", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::EmptyCanvas {
                width: 800,
                height: 0
            }
        );
    }

    #[test]
    fn non_finite_emitter_position_is_rejected() {
        let config = Config {
            emitter_position: Vec2::new(f32::NAN, 1.0),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotFinite {
                name: "emitter x",
                ..
            })
        ));
    }
}
