use glam::Vec2;

use crate::config::{ConfigError, require_positive};
use crate::ray::Ray;
use crate::visibility::{self, Hit};
use crate::world::Segment;

/// Upper bound on the rays of a single fan.
pub const MAX_RAYS: usize = 1 << 20;

/// Angular layout of an emitter's rays, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayFan {
    /// Total spread, centered on `heading`.
    pub fov: f32,
    /// Angle between neighbouring rays.
    pub step: f32,
    /// Direction of the fan's center, measured from +X towards +Y.
    pub heading: f32,
}

impl Default for RayFan {
    fn default() -> Self {
        Self {
            fov: 360.0,
            step: 0.5,
            heading: 0.0,
        }
    }
}

impl RayFan {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("field of view", self.fov)?;
        require_positive("angular step", self.step)?;
        if !self.heading.is_finite() {
            return Err(ConfigError::NotFinite {
                name: "heading",
                value: self.heading,
            });
        }

        let count = self.ray_count();
        if count > MAX_RAYS {
            return Err(ConfigError::TooManyRays { count });
        }
        Ok(())
    }

    /// Rays from `-fov/2` to `+fov/2` inclusive. Saturates at `usize::MAX`.
    pub fn ray_count(&self) -> usize {
        // small slack so that e.g. 360 / 0.5 is not floored to 719
        let steps = (self.fov as f64 / self.step as f64 + 1e-9).floor();
        (steps as usize).saturating_add(1)
    }

    /// Ray angles in radians, in fan order.
    pub fn angles(&self) -> impl Iterator<Item = f32> + '_ {
        let first = self.heading - self.fov / 2.0;
        (0..self.ray_count()).map(move |i| (first + i as f32 * self.step).to_radians())
    }
}

#[derive(Debug, Clone)]
pub struct Emitter {
    position: Vec2,
    radius: f32,
    rays: Vec<Ray>, // sized once, in fan order
}

impl Emitter {
    pub fn new(position: Vec2, radius: f32, fan: &RayFan) -> Result<Self, ConfigError> {
        require_positive("emitter radius", radius)?;
        fan.validate()?;

        let rays = fan.angles().map(|angle| Ray::new(position, angle)).collect();
        Ok(Self {
            position,
            radius,
            rays,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn reposition(&mut self, position: Vec2) {
        self.position = position;
        for ray in &mut self.rays {
            ray.reposition(position);
        }
    }

    /// Whether `point` lies strictly inside the emitter's grab radius.
    pub fn contains(&self, point: Vec2) -> bool {
        point.distance(self.position) < self.radius
    }

    pub fn compute_visibility(&self, segments: &[Segment]) -> Vec<Hit> {
        visibility::compute_visibility(&self.rays, segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan(fov: f32, step: f32) -> RayFan {
        RayFan {
            fov,
            step,
            heading: 0.0,
        }
    }

    #[test]
    fn ray_count_follows_fov_over_step() {
        for (fov, step, expected) in [
            (360.0, 0.5, 721),
            (360.0, 1.0, 361),
            (90.0, 1.0, 91),
            (10.0, 3.0, 4),
            (1.0, 2.0, 1),
            (0.3, 0.1, 4),
        ] {
            assert_eq!(
                fan(fov, step).ray_count(),
                expected,
                "fov {fov} step {step}"
            );
            let emitter = Emitter::new(Vec2::ZERO, 1.0, &fan(fov, step)).unwrap();
            assert_eq!(emitter.rays().len(), expected);
        }
    }

    #[test]
    fn fan_spans_fov_around_heading() {
        let fan = RayFan {
            fov: 90.0,
            step: 45.0,
            heading: 90.0,
        };
        let angles: Vec<f32> = fan.angles().collect();
        assert_eq!(angles.len(), 3);
        assert!((angles[0] - 45f32.to_radians()).abs() < 1e-6);
        assert!((angles[1] - 90f32.to_radians()).abs() < 1e-6);
        assert!((angles[2] - 135f32.to_radians()).abs() < 1e-6);

        let emitter = Emitter::new(Vec2::ZERO, 1.0, &fan).unwrap();
        let middle = emitter.rays()[1].direction();
        assert!(middle.x.abs() < 1e-6 && (middle.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn full_sweep_starts_and_ends_behind() {
        let emitter = Emitter::new(Vec2::ZERO, 1.0, &RayFan::default()).unwrap();
        let first = emitter.rays().first().unwrap().direction();
        let last = emitter.rays().last().unwrap().direction();
        assert!((first - Vec2::NEG_X).length() < 1e-5);
        assert!((last - Vec2::NEG_X).length() < 1e-5);
    }

    #[test]
    fn reposition_moves_every_ray() {
        let mut emitter = Emitter::new(Vec2::new(1.0, 2.0), 5.0, &fan(360.0, 10.0)).unwrap();
        let target = Vec2::new(123.25, -7.5);

        emitter.reposition(target);
        assert_eq!(emitter.position(), target);
        assert!(emitter.rays().iter().all(|ray| ray.origin == target));

        let snapshot = emitter.rays().to_vec();
        emitter.reposition(target);
        assert_eq!(emitter.rays(), snapshot.as_slice());
    }

    #[test]
    fn contains_is_strict() {
        let emitter = Emitter::new(Vec2::new(10.0, 10.0), 5.0, &fan(360.0, 1.0)).unwrap();
        assert!(emitter.contains(Vec2::new(10.0, 10.0)));
        assert!(emitter.contains(Vec2::new(14.9, 10.0)));
        assert!(!emitter.contains(Vec2::new(15.0, 10.0)));
        assert!(!emitter.contains(Vec2::new(13.0, 14.0)));
    }

    #[test]
    fn invalid_construction_fails() {
        assert!(matches!(
            Emitter::new(Vec2::ZERO, 0.0, &RayFan::default()),
            Err(ConfigError::NotPositive {
                name: "emitter radius",
                ..
            })
        ));
        assert!(matches!(
            Emitter::new(Vec2::ZERO, 1.0, &fan(360.0, 0.0)),
            Err(ConfigError::NotPositive {
                name: "angular step",
                ..
            })
        ));
        assert!(matches!(
            Emitter::new(Vec2::ZERO, 1.0, &fan(-1.0, 0.5)),
            Err(ConfigError::NotPositive {
                name: "field of view",
                ..
            })
        ));
        let fan_without_heading = RayFan {
            heading: f32::NAN,
            ..RayFan::default()
        };
        assert!(Emitter::new(Vec2::ZERO, 1.0, &fan_without_heading).is_err());
    }

    #[test]
    fn oversized_fan_fails_without_overflow() {
        let extreme = fan(f32::MAX, f32::MIN_POSITIVE);
        assert_eq!(extreme.ray_count(), usize::MAX);
        assert_eq!(
            extreme.validate(),
            Err(ConfigError::TooManyRays { count: usize::MAX })
        );

        let fine = fan(360.0, 1e-6);
        assert!(matches!(
            Emitter::new(Vec2::ZERO, 1.0, &fine),
            Err(ConfigError::TooManyRays { count }) if count > MAX_RAYS
        ));

        // 360 / (360 / 2^20) + 1 rays is just past the limit
        let limit = fan(360.0, 360.0 / MAX_RAYS as f32);
        assert_eq!(limit.ray_count(), MAX_RAYS + 1);
        assert!(limit.validate().is_err());
        let below = fan(360.0, 360.0 / (MAX_RAYS - 1) as f32);
        assert!(below.validate().is_ok());
    }
}
