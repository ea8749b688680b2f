//! Rays and ray-ray intersection.

use super::vector::{Vec2, EPSILON};

#[derive(Clone, Debug, Default, PartialEq)]
/// A ray defined by its start position and direction.
pub struct Ray {
    start: Vec2,
    dir: Vec2,
}

impl Ray {
    /// Create a new [Ray] from a position and direction.
    pub fn new(start: Vec2, dir: Vec2) -> Self {
        Self {
            start,
            dir: dir.normalize(),
        }
    }

    /// Get position at `t` along ray.
    pub fn calc(&self, t: f32) -> Vec2 {
        self.start + self.dir * t
    }

    #[inline]
    /// Get starting position
    pub fn start(&self) -> &Vec2 {
        &self.start
    }

    #[inline]
    /// Get direction
    pub fn dir(&self) -> &Vec2 {
        &self.dir
    }

    /// Intersection point with `other`, see [ray_intersect].
    pub fn intersect(&self, other: &Ray) -> Option<Vec2> {
        ray_intersect(self.start, self.dir, other.start, other.dir)
    }
}

/// Intersect the rays `a_start + t * a_dir` and `b_start + u * b_dir`.
///
/// Returns `None` when the directions are parallel or when the crossing lies behind either
/// origin (`t < 0` or `u < 0`). Directions need not be normalized.
pub fn ray_intersect(a_start: Vec2, a_dir: Vec2, b_start: Vec2, b_dir: Vec2) -> Option<Vec2> {
    let dx = b_start.x() - a_start.x();
    let dy = b_start.y() - a_start.y();

    let det = b_dir.x() * a_dir.y() - b_dir.y() * a_dir.x();
    if det.abs() < EPSILON {
        return None;
    }

    let t = (dy * b_dir.x() - dx * b_dir.y()) / det;
    if t < 0. {
        return None;
    }

    let u = (dy * a_dir.x() - dx * a_dir.y()) / det;
    if u < 0. {
        return None;
    }

    Some(a_start + a_dir * t)
}
