//! Light colliders: convex polygons that block light and cast shadows.

use crate::{
    matrix::Transform, primitives::ConvexShape, rect::FloatRect, vector::Vec2,
};

#[derive(Clone, Debug, PartialEq)]
/// Convex polygon blocking light.
///
/// Points are in the occluder's local frame. The occluder carries its own local transform on
/// top of the owning entity's transform; world points are `entity ∘ local ∘ point`.
pub struct Occluder {
    shape: ConvexShape,
    transform: Transform,
    active: bool,
    light_over_shape: bool,
}

impl Default for Occluder {
    fn default() -> Self {
        Self {
            shape: ConvexShape::default(),
            transform: Transform::default(),
            active: true,
            light_over_shape: false,
        }
    }
}

activatable!(Occluder);

impl Occluder {
    /// Occluder from an outline.
    pub fn new(points: Vec<Vec2>) -> Self {
        Self {
            shape: points.into(),
            ..Default::default()
        }
    }

    /// Occluder with `count` points at the origin.
    pub fn with_point_count(count: usize) -> Self {
        Self {
            shape: ConvexShape::with_point_count(count),
            ..Default::default()
        }
    }

    #[allow(missing_docs)]
    pub fn set_point_count(&mut self, count: usize) {
        self.shape.set_point_count(count);
    }

    #[allow(missing_docs)]
    pub fn point_count(&self) -> usize {
        self.shape.point_count()
    }

    /// Returns `false` if `index` is out of range.
    pub fn set_point(&mut self, index: usize, point: Vec2) -> bool {
        self.shape.set_point(index, point)
    }

    #[allow(missing_docs)]
    pub fn point(&self, index: usize) -> Option<Vec2> {
        self.shape.point(index)
    }

    #[allow(missing_docs)]
    pub fn points(&self) -> &[Vec2] {
        self.shape.points()
    }

    /// Replace the outline, resizing it to `points.len()`.
    pub fn set_points(&mut self, points: &[Vec2]) {
        self.shape.set_points(points);
    }

    /// Local transform applied before the entity transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[allow(missing_docs)]
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Shift the occluder in its entity's frame.
    pub fn move_by(&mut self, offset: Vec2) {
        self.transform.move_by(offset);
    }

    /// Bounds in the entity's frame (local transform applied).
    pub fn bounding_box(&self) -> FloatRect {
        self.transform.transform_rect(&self.shape.local_bounds())
    }

    /// Bounds in world space.
    pub fn world_bounds(&self, entity_transform: &Transform) -> FloatRect {
        entity_transform.transform_rect(&self.bounding_box())
    }

    /// Outline in world space.
    pub fn world_points(&self, entity_transform: &Transform) -> Vec<Vec2> {
        self.shape
            .transformed_points(&entity_transform.combine(&self.transform))
    }

    /// Whether the light renders across the occluder's surface while still shadowing what lies
    /// behind it.
    pub fn light_over_shape(&self) -> bool {
        self.light_over_shape
    }

    #[allow(missing_docs)]
    pub fn set_light_over_shape(&mut self, light_over_shape: bool) {
        self.light_over_shape = light_over_shape;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_square() -> Occluder {
        Occluder::new(vec![
            Vec2::new(0., 0.),
            Vec2::new(1., 0.),
            Vec2::new(1., 1.),
            Vec2::new(0., 1.),
        ])
    }

    #[test]
    fn world_geometry() {
        let mut occluder = unit_square();
        occluder.move_by(Vec2::new(2., 0.));

        let entity = Transform::default().translate(Vec2::new(10., 10.));

        assert_eq!(FloatRect::new(2., 0., 1., 1.), occluder.bounding_box());
        assert_eq!(
            FloatRect::new(12., 10., 1., 1.),
            occluder.world_bounds(&entity)
        );
        assert_eq!(Vec2::new(13., 11.), occluder.world_points(&entity)[2]);
    }

    #[test]
    fn flags() {
        let mut occluder = Occluder::with_point_count(3);
        assert!(occluder.is_active());
        assert!(!occluder.light_over_shape());

        occluder.toggle_active();
        occluder.set_light_over_shape(true);
        assert!(!occluder.is_active());
        assert!(occluder.light_over_shape());

        occluder.set_active(true);
        assert!(occluder.is_active());
    }

    #[test]
    fn resizing_outline() {
        let mut occluder = unit_square();
        occluder.set_points(&[Vec2::new(0., 0.), Vec2::new(2., 0.), Vec2::new(0., 2.)]);
        assert_eq!(3, occluder.point_count());
        assert_eq!(Some(Vec2::new(2., 0.)), occluder.point(1));
        assert!(!occluder.set_point(3, Vec2::default()));
    }
}
