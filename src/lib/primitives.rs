//! Basic primitives necessary for rendering

use crate::{color::Color, matrix::Transform, rect::FloatRect, vector::Vec2};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// A triangle vertex handed to the rasterizer.
pub struct Vertex {
    /// World-space position.
    pub position: Vec2,
    /// Texture coordinates, interpolated across the triangle.
    pub uv: Vec2,
    /// Vertex color, interpolated across the triangle.
    pub color: Color,
}

impl Vertex {
    /// White vertex with texture coordinates.
    pub fn new(position: Vec2, uv: Vec2) -> Self {
        Self {
            position,
            uv,
            color: Color::WHITE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Ordered outline of a convex polygon in local coordinates.
///
/// Convexity and a consistent winding are the caller's responsibility; shadow geometry is
/// meaningless otherwise.
pub struct ConvexShape {
    points: Vec<Vec2>,
}

impl ConvexShape {
    /// Shape with `count` points at the origin.
    pub fn with_point_count(count: usize) -> Self {
        Self {
            points: vec![Vec2::default(); count],
        }
    }

    /// Resize the outline, new points start at the origin.
    pub fn set_point_count(&mut self, count: usize) {
        self.points.resize(count, Vec2::default());
    }

    #[allow(missing_docs)]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Returns `false` if `index` is out of range.
    pub fn set_point(&mut self, index: usize, point: Vec2) -> bool {
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    #[allow(missing_docs)]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.points.get(index).copied()
    }

    #[allow(missing_docs)]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Replace every point at once.
    pub fn set_points(&mut self, points: &[Vec2]) {
        self.points.clear();
        self.points.extend_from_slice(points);
    }

    /// Points mapped through `transform`.
    pub fn transformed_points(&self, transform: &Transform) -> Vec<Vec2> {
        self.points
            .iter()
            .map(|&point| transform.transform_point(point))
            .collect()
    }

    /// Local bounds of the outline.
    pub fn local_bounds(&self) -> FloatRect {
        FloatRect::from_points(self.points.iter().copied())
    }
}

impl From<Vec<Vec2>> for ConvexShape {
    fn from(points: Vec<Vec2>) -> Self {
        Self { points }
    }
}
