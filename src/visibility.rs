//! Nearest-hit scan of a ray fan against the obstacle set.
//!
//! Stateless: every call rebuilds the full result from the rays and segments
//! it is given, so a frame never observes data from a previous one.

use glam::Vec2;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::ray::{PROBE_LENGTH, Ray};
use crate::world::Segment;

/// Nearest obstacle along one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Distance from the ray origin to `point`, or [`PROBE_LENGTH`] on a miss.
    pub distance: f32,
    pub point: Option<Vec2>,
}

impl Hit {
    pub const MISS: Hit = Hit {
        distance: PROBE_LENGTH,
        point: None,
    };
}

/// Closest valid intersection of `ray` with any of `segments`.
pub fn nearest_hit(ray: &Ray, segments: &[Segment]) -> Hit {
    let mut nearest = Hit::MISS;
    let mut record = f32::INFINITY;

    for segment in segments {
        let Some(point) = ray.intersect(segment) else {
            continue;
        };
        let distance = ray.origin.distance(point);
        if distance < record {
            record = distance;
            nearest = Hit {
                distance,
                point: Some(point),
            };
        }
    }

    nearest
}

/// One [`Hit`] per ray, in ray order. O(rays x segments); rays are scanned
/// in parallel.
pub fn compute_visibility(rays: &[Ray], segments: &[Segment]) -> Vec<Hit> {
    rays.par_iter()
        .map(|ray| nearest_hit(ray, segments))
        .collect()
}
