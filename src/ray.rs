use glam::Vec2;

use crate::world::Segment;

/// Length of the far probe point. It bounds nothing in the forward direction
/// but must exceed any on-screen distance, and is also the drawn length of a
/// ray that hits nothing.
pub const PROBE_LENGTH: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    direction: Vec2, // unit length, fixed after construction
}

impl Ray {
    /// Ray leaving `origin` at `angle` radians, measured from +X towards +Y.
    pub fn new(origin: Vec2, angle: f32) -> Self {
        Self {
            origin,
            direction: Vec2::from_angle(angle),
        }
    }

    pub fn from_direction(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    #[inline]
    pub fn reposition(&mut self, origin: Vec2) {
        self.origin = origin;
    }

    /// Point where the ray crosses `segment`, strictly between its endpoints
    /// and strictly in front of the origin.
    ///
    /// A ray running parallel to the segment never reports a hit, even when
    /// it overlaps it.
    pub fn intersect(&self, segment: &Segment) -> Option<Vec2> {
        let (a, b) = (segment.a, segment.b);
        let p0 = self.origin;
        let p1 = self.origin + self.direction * PROBE_LENGTH;

        let denominator = (a.x - b.x) * (p0.y - p1.y) - (a.y - b.y) * (p0.x - p1.x);
        if denominator == 0.0 {
            return None;
        }

        // t runs along the segment, u along the probe
        let t = ((a.x - p0.x) * (p0.y - p1.y) - (a.y - p0.y) * (p0.x - p1.x)) / denominator;
        let u = -((a.x - b.x) * (a.y - p0.y) - (a.y - b.y) * (a.x - p0.x)) / denominator;

        if t > 0.0 && t < 1.0 && u > 0.0 {
            Some(a + t * (b - a))
        } else {
            None
        }
    }
}
