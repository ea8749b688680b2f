//! Silhouette and penumbra computation for one light and one convex occluder.
//!
//! The light is an area light: a disk of `radius` around `center`. Seen from the disk, every
//! occluder vertex has two tangent rays, one from each side of the disk. Comparing those rays
//! with the polygon's edge normals classifies the silhouette twice:
//!
//! * the *inner* boundaries, where both tangent rays agree, bound the umbra;
//! * the *outer* boundaries, where either ray sees the edge, bound the penumbra.
//!
//! The region between them is split into [Penumbra] wedges whose brightness falls from 1 on the
//! lit side to 0 on the umbra side.

use crate::vector::Vec2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Which end of the silhouette a boundary sits on.
///
/// The side decides the walking direction along the outline and which edge of the light disk
/// the light and dark rays start from.
pub enum Side {
    /// Boundary where the classification turns from back to front facing, walked forwards.
    Near,
    /// Boundary where it turns from front to back facing, walked backwards.
    Far,
}

impl Side {
    fn from_facing(front: bool) -> Self {
        if front {
            Side::Far
        } else {
            Side::Near
        }
    }

    /// Index of the vertex following `index` away from the umbra.
    pub fn step(self, index: usize, count: usize) -> usize {
        match self {
            Side::Near => (index + 1) % count,
            Side::Far => (index + count - 1) % count,
        }
    }

    /// Disk side the unobstructed tangent ray starts from.
    fn light_sign(self) -> f32 {
        match self {
            Side::Near => 1.,
            Side::Far => -1.,
        }
    }

    fn dark_sign(self) -> f32 {
        -self.light_sign()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Silhouette vertex where the facing classification flips.
pub struct Boundary {
    /// Vertex index in the occluder outline.
    pub index: usize,
    #[allow(missing_docs)]
    pub side: Side,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// One wedge of partial shadow, anchored on an occluder vertex.
pub struct Penumbra {
    /// Apex of the wedge.
    pub source: Vec2,
    /// Direction of the lit side.
    pub light_edge: Vec2,
    /// Direction of the shadowed side.
    pub dark_edge: Vec2,
    /// Brightness along `light_edge`.
    pub light_brightness: f32,
    /// Brightness along `dark_edge`, 0 for full shadow.
    pub dark_brightness: f32,
    /// Distance from the light center to the apex.
    pub distance: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Everything the renderer needs to shadow one occluder.
pub struct Silhouette {
    /// Umbra boundaries.
    pub inner: Vec<Boundary>,
    /// Tangent ray directions leaving the inner boundaries. Always at least as long as `inner`,
    /// a lone inner boundary gets both of its rays.
    pub inner_vectors: Vec<Vec2>,
    /// Penumbra boundaries.
    pub outer: Vec<Boundary>,
    /// Dark ray directions leaving the outer boundaries, one per entry of `outer`.
    pub outer_vectors: Vec<Vec2>,
    /// Wedge chains, one chain per inner boundary, each ordered from the umbra outwards.
    pub penumbras: Vec<Penumbra>,
}

impl Silhouette {
    /// Exactly two inner and two outer boundaries, anything else is a degenerate view.
    pub fn is_valid(&self) -> bool {
        self.inner.len() == 2 && self.outer.len() == 2
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Penumbra solver for a light disk, expressed in the occluder's frame.
pub struct PenumbraSolver {
    /// Light center.
    pub center: Vec2,
    /// Light disk radius, 0 for hard shadows.
    pub radius: f32,
}

impl PenumbraSolver {
    #[allow(missing_docs)]
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Ray reaching `point` from the edge of the light disk on the `sign` side.
    fn tangent_ray(&self, point: Vec2, sign: f32) -> Vec2 {
        let offset = (point - self.center).perpendicular().normalize() * (self.radius * sign);
        point - (self.center + offset)
    }

    /// Per-edge facing flags, `(both rays, any ray)`.
    fn classify(&self, points: &[Vec2]) -> (Vec<bool>, Vec<bool>) {
        let count = points.len();
        let mut facing_both = Vec::with_capacity(count);
        let mut facing_one = Vec::with_capacity(count);

        for (i, &point) in points.iter().enumerate() {
            let next = points[(i + 1) % count];
            let normal = (next - point).perpendicular().normalize();

            let front =
                |vertex: Vec2, sign: f32| self.tangent_ray(vertex, sign).dot_product(&normal) > 0.;
            let (point_dark, point_light) = (front(point, -1.), front(point, 1.));
            let (next_dark, next_light) = (front(next, -1.), front(next, 1.));

            facing_both.push((point_dark && point_light) || (next_dark && next_light));
            facing_one.push(point_dark || point_light || next_dark || next_light);
        }

        (facing_both, facing_one)
    }

    /// Flips in a facing list, wraparound pair last.
    fn boundaries(flags: &[bool]) -> Vec<Boundary> {
        let Some((&first, _)) = flags.split_first() else {
            return Vec::new();
        };

        let mut boundaries: Vec<Boundary> = flags
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(i, pair)| Boundary {
                index: i + 1,
                side: Side::from_facing(pair[1]),
            })
            .collect();

        if flags.last().is_some_and(|&last| last != first) {
            boundaries.push(Boundary {
                index: 0,
                side: Side::from_facing(first),
            });
        }

        boundaries
    }

    /// Compute the silhouette of a world-space outline.
    ///
    /// An empty outline gives an empty (invalid) silhouette.
    pub fn solve(&self, points: &[Vec2]) -> Silhouette {
        let mut silhouette = Silhouette::default();
        if points.is_empty() {
            return silhouette;
        }

        let (facing_both, facing_one) = self.classify(points);
        silhouette.inner = Self::boundaries(&facing_both);
        silhouette.outer = Self::boundaries(&facing_one);

        silhouette.outer_vectors = silhouette
            .outer
            .iter()
            .map(|boundary| self.tangent_ray(points[boundary.index], boundary.side.dark_sign()))
            .collect();

        for boundary in silhouette.inner.clone() {
            let point = points[boundary.index];
            let inner_vector = self.tangent_ray(point, boundary.side.light_sign());
            silhouette.inner_vectors.push(inner_vector);

            if silhouette.inner.len() == 1 {
                silhouette
                    .inner_vectors
                    .push(self.tangent_ray(point, boundary.side.dark_sign()));
            }

            self.walk(points, boundary, inner_vector, &mut silhouette);
        }

        silhouette
    }

    /// Emit the wedge chain starting at an inner boundary and move the matching outer boundary
    /// to where the chain ends.
    fn walk(
        &self,
        points: &[Vec2],
        start: Boundary,
        inner_vector: Vec2,
        silhouette: &mut Silhouette,
    ) {
        let side = start.side;
        let count = points.len();

        let mut index = start.index;
        let mut point = points[index];
        let mut light_edge = inner_vector;
        let mut dark_edge = self.tangent_ray(point, side.dark_sign());
        let mut brightness = 1.;

        for _ in 0..count {
            let next = side.step(index, count);
            let to_next = points[next] - point;

            let next_angle = light_edge.angle_to(&to_next);
            let penumbra_angle = light_edge.angle_to(&dark_edge);
            let distance = (point - self.center).len();

            if next_angle < penumbra_angle {
                // The next vertex lies inside the penumbra, split the wedge along the edge.
                let dark_brightness = brightness * (1. - next_angle / penumbra_angle);
                silhouette.penumbras.push(Penumbra {
                    source: point,
                    light_edge,
                    dark_edge: to_next,
                    light_brightness: brightness,
                    dark_brightness,
                    distance,
                });

                brightness = dark_brightness;
                light_edge = to_next;
                index = next;
                point = points[next];
                dark_edge = self.tangent_ray(point, side.dark_sign());
            } else {
                silhouette.penumbras.push(Penumbra {
                    source: point,
                    light_edge,
                    dark_edge,
                    light_brightness: brightness,
                    dark_brightness: 0.,
                    distance,
                });
                break;
            }
        }

        let outer = silhouette
            .outer
            .iter()
            .position(|boundary| boundary.side == side);
        if let Some(slot) = outer {
            silhouette.outer[slot].index = index;
            silhouette.outer_vectors[slot] = dark_edge;
        }
    }
}
