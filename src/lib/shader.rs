//! Fragment shaders run by the [Canvas](crate::canvas::Canvas) rasterizer.
//!
//! A [Shader] turns one covered pixel into a color; the canvas then blends that color into the
//! target with the requested [BlendMode](crate::canvas::BlendMode).

use crate::{
    color::Color,
    image::Image,
    vector::{Vec2, EPSILON},
};

#[derive(Clone, Debug, PartialEq)]
/// Everything known about a pixel covered by a triangle.
pub struct Fragment {
    /// Pixel coordinates in the target.
    pub pixel: (u32, u32),
    /// Weights of the three triangle vertices, in vertex order, summing to 1.
    pub barycentric: [f32; 3],
    /// Interpolated texture coordinates.
    pub uv: Vec2,
    /// Interpolated vertex color.
    pub color: Color,
}

/// Programmable shading stage.
pub trait Shader {
    /// Color for a covered pixel.
    fn fragment(&self, fragment: &Fragment) -> Color;
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Constant color.
pub struct FlatColor(pub Color);

impl Shader for FlatColor {
    fn fragment(&self, _fragment: &Fragment) -> Color {
        self.0
    }
}

#[derive(Clone, Copy, Debug)]
/// Bilinear texture lookup modulated by a tint.
pub struct Textured<'a> {
    #[allow(missing_docs)]
    pub texture: &'a Image<Color>,
    #[allow(missing_docs)]
    pub tint: Color,
}

impl Shader for Textured<'_> {
    fn fragment(&self, fragment: &Fragment) -> Color {
        self.texture.sample(fragment.uv.x(), fragment.uv.y()) * self.tint
    }
}

#[derive(Clone, Copy, Debug)]
/// Soft-edge gradient across a penumbra wedge.
///
/// The wedge is drawn with its vertices ordered `[source, light edge end, dark edge end]`
/// and texture coordinates `(0, 1)`, `(1, 0)`, `(0, 0)`. The output brightness moves from
/// `light_brightness` on the light edge to `dark_brightness` on the dark edge. With a
/// penumbra texture the red channel at the interpolated coordinates gives the position
/// between the two edges; without one the position is the angular fraction derived from the
/// barycentric weights, which is linear along the far side of the wedge.
pub struct Unshadow<'a> {
    /// Optional lookup texture shaping the gradient.
    pub penumbra_texture: Option<&'a Image<Color>>,
    /// Brightness on the light edge.
    pub light_brightness: f32,
    /// Brightness on the dark edge.
    pub dark_brightness: f32,
}

impl Unshadow<'_> {
    /// 1 on the light edge, 0 on the dark edge.
    fn edge_position(&self, fragment: &Fragment) -> f32 {
        match self.penumbra_texture {
            Some(texture) => texture.sample(fragment.uv.x(), fragment.uv.y()).r,
            None => {
                let [_, light, dark] = fragment.barycentric;
                let sum = light + dark;
                if sum < EPSILON {
                    1.
                } else {
                    light / sum
                }
            }
        }
    }
}

impl Shader for Unshadow<'_> {
    fn fragment(&self, fragment: &Fragment) -> Color {
        let position = self.edge_position(fragment).clamp(0., 1.);
        Color::gray(
            self.dark_brightness + (self.light_brightness - self.dark_brightness) * position,
        )
    }
}

#[derive(Clone, Copy, Debug)]
/// Fill color modulated by the light's unoccluded emission at the same pixel, so a white
/// shape lets the light through with its natural falloff and a black one stays opaque.
pub struct LightOverShape<'a> {
    /// Emission buffer, same size as the target.
    pub emission: &'a Image<Color>,
    /// Fill color of the shape.
    pub fill: Color,
}

impl Shader for LightOverShape<'_> {
    fn fragment(&self, fragment: &Fragment) -> Color {
        let (x, y) = fragment.pixel;
        self.emission.get(x, y).copied().unwrap_or(Color::BLACK) * self.fill
    }
}
