//! 2D vector definition

use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use paste::paste;

/// Scalar type used by [Vector] when none is given.
pub type DefaultType = f32;
/// Dimension used by [Vector] when none is given.
pub const DEFAULT_DIM: usize = 2;

/// Lengths below this value are considered zero.
pub const EPSILON: f32 = 1e-6;

#[derive(PartialEq, Clone, Copy, Debug)]
/// DIM-dimensional vector of TYPE values.
pub struct Vector<const DIM: usize = DEFAULT_DIM, TYPE = DefaultType> {
    /// Coordinate vector.
    pub inner: [TYPE; DIM],
}

/// Plain 2D float vector, the only flavour the lighting code needs.
pub type Vec2 = Vector<2, f32>;

impl<const DIM: usize, TYPE: Default + Copy> Default for Vector<DIM, TYPE> {
    fn default() -> Self {
        Self {
            inner: [TYPE::default(); DIM],
        }
    }
}

impl<const DIM: usize, TYPE> Index<usize> for Vector<DIM, TYPE> {
    type Output = TYPE;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inner[index]
    }
}

impl<const DIM: usize, TYPE> IndexMut<usize> for Vector<DIM, TYPE> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.inner[index]
    }
}

macro_rules! into_primitive_array {
    ($($target:ty),+ $(,)?) => {
        $(
            impl<const DIM: usize> From<Vector<DIM, $target>> for [$target; DIM] {
                fn from(value: Vector<DIM, $target>) -> Self {
                    value.inner
                }
            }

            impl<const DIM: usize> From<[$target; DIM]> for Vector<DIM, $target> {
                fn from(value: [$target; DIM]) -> Self {
                    Self {
                        inner: value
                    }
                }
            }
        )+
    };
}

into_primitive_array!(i32, f32);

macro_rules! impl_vec_vec_op {
    ($trait:ident, $function:ident, $($op:tt)+) => {
        paste! {
            impl<const DIM: usize, TYPE: Copy + [<$trait Assign>]<TYPE>> [<$trait Assign>]<Self> for Vector<DIM, TYPE> {
                fn [<$function _assign>](&mut self, rhs: Self) {
                    for (l, r) in self.inner.iter_mut().zip(rhs.inner.iter()) {
                        *l $($op)+ *r;
                    }
                }
            }

            impl<const DIM: usize, TYPE: Copy + [<$trait Assign>]<TYPE>> $trait<Self> for Vector<DIM, TYPE> {
                type Output = Self;

                fn $function(mut self, rhs: Self) -> Self::Output {
                    self $($op)+ rhs;
                    self
                }
            }
        }
    }
}

impl_vec_vec_op! (Add, add, +=);
impl_vec_vec_op! (Sub, sub, -=);

macro_rules! impl_vec_type_op {
    ($trait:ident, $function:ident, $($op:tt)+) => {
        paste! {
            impl<const DIM: usize, TYPE: Copy + [<$trait Assign>]<TYPE>> [<$trait Assign>]<TYPE> for Vector<DIM, TYPE> {
                fn [<$function _assign>](&mut self, rhs: TYPE) {
                    for v in self.inner.as_mut_slice() {
                        *v $($op)+ rhs;
                    }
                }
            }

            impl<const DIM: usize, TYPE: Copy + [<$trait Assign>]<TYPE>> $trait<TYPE> for Vector<DIM, TYPE> {
                type Output = Self;

                fn $function(mut self, rhs: TYPE) -> Self::Output {
                    self $($op)+ rhs;
                    self
                }
            }
        }
    }
}

impl_vec_type_op! (Mul, mul, *=);
impl_vec_type_op! (Div, div, /=);

impl<const DIM: usize, TYPE: Copy + Neg<Output = TYPE>> Neg for Vector<DIM, TYPE> {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        for v in self.inner.iter_mut() {
            *v = -*v;
        }

        self
    }
}

impl<TYPE> Vector<2, TYPE> {
    /// Create a new 2D vector from values.
    pub fn new(x: TYPE, y: TYPE) -> Self {
        Self { inner: [x, y] }
    }
}

impl<TYPE: Copy> Vector<2, TYPE> {
    #[inline]
    #[allow(missing_docs)]
    pub fn x(&self) -> TYPE {
        self.inner[0]
    }

    #[inline]
    #[allow(missing_docs)]
    pub fn y(&self) -> TYPE {
        self.inner[1]
    }
}

impl<TYPE: Copy + Neg<Output = TYPE>> Vector<2, TYPE> {
    #[inline]
    /// Left-hand perpendicular `(-y, x)`.
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.inner[1], self.inner[0])
    }
}

impl<const DIM: usize, TYPE: Copy + Default + Add<Output = TYPE> + Mul<Output = TYPE>>
    Vector<DIM, TYPE>
{
    #[inline]
    /// Get squared length of the vector, slightly faster than [Vector::len].
    pub fn len_sq(&self) -> TYPE {
        self.dot_product(self)
    }

    /// Perform dot product with `other`.
    pub fn dot_product(&self, other: &Self) -> TYPE {
        self.inner
            .iter()
            .zip(other.inner.iter())
            .fold(TYPE::default(), |acc, cur| acc + *cur.0 * *cur.1)
    }
}

impl<const DIM: usize> Vector<DIM, f32> {
    #[inline]
    /// Get length of the vector.
    pub fn len(&self) -> f32 {
        self.len_sq().sqrt()
    }

    #[inline]
    /// Get normalized vector pointing in the same direction.
    ///
    /// Vectors shorter than [EPSILON] have no direction and are returned unchanged.
    pub fn normalize(&self) -> Self {
        let len = self.len();
        if len < EPSILON {
            *self
        } else {
            *self / len
        }
    }

    /// Get unsigned angle to `other` vector in radians.
    ///
    /// Returns 0 if either vector has no direction.
    pub fn angle_to(&self, other: &Self) -> f32 {
        let lengths = self.len() * other.len();
        if lengths < EPSILON {
            return 0.;
        }

        (self.dot_product(other) / lengths).clamp(-1., 1.).acos()
    }

    #[inline]
    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        let mut res = *self;
        for (l, r) in res.inner.iter_mut().zip(other.inner.iter()) {
            *l = l.min(*r);
        }
        res
    }
}

impl Vec2 {
    /// Rotate around the origin by `angle` radians.
    pub fn rotate(&self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(
            self.inner[0] * cos - self.inner[1] * sin,
            self.inner[0] * sin + self.inner[1] * cos,
        )
    }
}
