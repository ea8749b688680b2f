//! Axis-aligned rectangles used for bounds tests and spatial-index notifications.

use crate::vector::Vec2;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
/// Float rectangle in `left/top/width/height` form, `y` growing downwards.
pub struct FloatRect {
    #[allow(missing_docs)]
    pub left: f32,
    #[allow(missing_docs)]
    pub top: f32,
    #[allow(missing_docs)]
    pub width: f32,
    #[allow(missing_docs)]
    pub height: f32,
}

impl FloatRect {
    #[allow(missing_docs)]
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Smallest rectangle containing every point. Empty input gives an empty rectangle.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Self::default();
        };

        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Vec2::new(min.x().min(p.x()), min.y().min(p.y())),
                Vec2::new(max.x().max(p.x()), max.y().max(p.y())),
            )
        });

        Self::new(min.x(), min.y(), max.x() - min.x(), max.y() - min.y())
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Corners in clockwise screen order, starting top-left.
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.left, self.top),
            Vec2::new(self.right(), self.top),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.left, self.bottom()),
        ]
    }

    /// Strict overlap test; rectangles that only touch do not intersect.
    pub fn intersects(&self, other: &FloatRect) -> bool {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        left < right && top < bottom
    }

    #[allow(missing_docs)]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x() >= self.left
            && point.x() < self.right()
            && point.y() >= self.top
            && point.y() < self.bottom()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
/// Integer rectangle, as handed to spatial-index maintenance callbacks.
pub struct IntRect {
    #[allow(missing_docs)]
    pub left: i32,
    #[allow(missing_docs)]
    pub top: i32,
    #[allow(missing_docs)]
    pub width: i32,
    #[allow(missing_docs)]
    pub height: i32,
}

impl From<FloatRect> for IntRect {
    /// Rounds outwards so the integer rectangle always covers the float one.
    fn from(rect: FloatRect) -> Self {
        let left = rect.left.floor() as i32;
        let top = rect.top.floor() as i32;

        Self {
            left,
            top,
            width: rect.right().ceil() as i32 - left,
            height: rect.bottom().ceil() as i32 - top,
        }
    }
}
