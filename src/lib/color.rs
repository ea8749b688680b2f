//! Float and 8-bit RGB colors.

use std::{
    iter::Sum,
    ops::{Div, Mul},
};

use ::derive_more::{Add, AddAssign};

#[derive(Clone, Copy, Default, Debug, Add, AddAssign, PartialEq)]
/// Linear RGB color with channels nominally in `[0, 1]`.
pub struct Color {
    #[allow(missing_docs)]
    pub r: f32,
    #[allow(missing_docs)]
    pub g: f32,
    #[allow(missing_docs)]
    pub b: f32,
}

impl Color {
    #[allow(missing_docs)]
    pub const BLACK: Color = Color::gray(0.);
    #[allow(missing_docs)]
    pub const WHITE: Color = Color::gray(1.);

    #[allow(missing_docs)]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// Same value on every channel.
    pub const fn gray(value: f32) -> Self {
        Color {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Quantize to 8 bits per channel, clamping first.
    pub fn as_bytes(&self) -> [u8; 3] {
        let Color { r, g, b } = self.clamp();
        [
            (r * 255.).round() as u8,
            (g * 255.).round() as u8,
            (b * 255.).round() as u8,
        ]
    }

    #[allow(missing_docs)]
    pub fn clamp(&self) -> Self {
        Self {
            r: self.r.clamp(0., 1.),
            g: self.g.clamp(0., 1.),
            b: self.b.clamp(0., 1.),
        }
    }

    /// Mean of the three channels.
    pub fn luminance(&self) -> f32 {
        (self.r + self.g + self.b) / 3.
    }
}

impl Mul<f32> for Color {
    type Output = Self;

    fn mul(mut self, rhs: f32) -> Self::Output {
        self.r *= rhs;
        self.g *= rhs;
        self.b *= rhs;

        self
    }
}

impl Mul for Color {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self::Output {
        self.r *= rhs.r;
        self.g *= rhs.g;
        self.b *= rhs.b;

        self
    }
}

impl Sum<Color> for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Self {
        iter.reduce(|acc, cur| acc + cur)
            .unwrap_or(Color::default())
    }
}

impl Div<f32> for Color {
    type Output = Self;
    fn div(mut self, rhs: f32) -> Self::Output {
        self.r /= rhs;
        self.g /= rhs;
        self.b /= rhs;

        self
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color8::new(r, g, b).into()
    }
}

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
/// 8-bit RGB color, used where colors are stored rather than computed (light tints, ambient).
pub struct Color8 {
    #[allow(missing_docs)]
    pub r: u8,
    #[allow(missing_docs)]
    pub g: u8,
    #[allow(missing_docs)]
    pub b: u8,
}

impl Color8 {
    #[allow(missing_docs)]
    pub const BLACK: Color8 = Color8::new(0, 0, 0);
    #[allow(missing_docs)]
    pub const WHITE: Color8 = Color8::new(255, 255, 255);

    #[allow(missing_docs)]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color8 { r, g, b }
    }

    /// Channels as a mutable array, handy for per-channel loops.
    pub fn channels_mut(&mut self) -> [&mut u8; 3] {
        [&mut self.r, &mut self.g, &mut self.b]
    }

    #[allow(missing_docs)]
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<Color8> for Color {
    fn from(Color8 { r, g, b }: Color8) -> Self {
        Color::new(r as f32 / 255., g as f32 / 255., b as f32 / 255.)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn byte_conversion() {
        let color: Color = Color8::new(255, 0, 51).into();
        assert_eq!(1., color.r);
        assert_eq!(0., color.g);
        assert!((color.b - 0.2).abs() < 0.000_1);
        assert_eq!([255, 0, 51], color.as_bytes());
    }

    #[test]
    fn bytes_are_clamped() {
        assert_eq!([255, 0, 128], Color::new(3., -1., 0.5).as_bytes());
    }
}
