//! Basic image implementation with PPM saving and loading

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use super::color::Color;

#[derive(Debug, thiserror::Error)]
/// Errors raised while reading or writing images.
pub enum Error {
    #[error("I/O error: {0}")]
    /// Underlying file error.
    Io(#[from] std::io::Error),

    #[error("Invalid PPM header: {0}")]
    /// Magic number, dimensions or depth could not be understood.
    InvalidHeader(String),

    #[error("Truncated pixel data, expected {expected} bytes, got {got}")]
    /// File ends before every pixel was read.
    Truncated {
        /// Bytes required by the header.
        expected: usize,
        /// Bytes actually present.
        got: usize,
    },
}

#[derive(Clone, Debug, PartialEq)]
/// Generic image struct. Usage of the word `pixel` in this documentation refers to an instance of
/// the stored data type.
pub struct Image<T> {
    /// Width of the image in pixels
    pub width: u32,
    /// Height of the image in pixels
    pub height: u32,
    /// Vector containing the image's pixels, row by row from the top
    pub pixels: Vec<T>,
}

impl<T: Clone> Image<T> {
    /// Create an image from a pixel width and height and a default value
    pub fn new(width: u32, height: u32, value: T) -> Self {
        Self {
            width,
            height,
            pixels: vec![value; (width * height) as usize],
        }
    }

    /// Get a pixel at x/y coordinates, if inside the image.
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        (x < self.width && y < self.height)
            .then(|| &self.pixels[(y * self.width + x) as usize])
    }

    /// Set a pixel at x/y coordinates
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        self.pixels[(y * self.width + x) as usize] = value;
    }

    /// Fill every pixel with `value`.
    pub fn fill(&mut self, value: T) {
        self.pixels.fill(value);
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

impl Image<Color> {
    /// Save current state as a binary .ppm according to the path given as argument
    pub fn save_as_ppm(&self, path: &Path) -> Result<(), Error> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);
        writer.write_all(format!("P6 {} {} {}\n", self.width, self.height, u8::MAX).as_bytes())?;

        let bytes: Vec<[u8; 3]> = self.pixels.iter().map(Color::as_bytes).collect();
        writer.write_all(bytemuck::cast_slice(&bytes))?;
        writer.flush()?;

        Ok(())
    }

    /// Load a binary (P6) .ppm file.
    pub fn load_ppm(path: &Path) -> Result<Self, Error> {
        Self::parse_ppm(&std::fs::read(path)?)
    }

    /// Decode the bytes of a binary (P6) .ppm file.
    pub fn parse_ppm(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = 0;

        let magic = next_token(bytes, &mut cursor)
            .ok_or_else(|| Error::InvalidHeader("missing magic number".to_string()))?;
        if magic != b"P6" {
            return Err(Error::InvalidHeader(format!(
                "unsupported magic number `{}`",
                String::from_utf8_lossy(magic)
            )));
        }

        let mut header_value = |name: &str| -> Result<u32, Error> {
            let token = next_token(bytes, &mut cursor)
                .ok_or_else(|| Error::InvalidHeader(format!("missing {name}")))?;
            std::str::from_utf8(token)
                .ok()
                .and_then(|token| token.parse().ok())
                .ok_or_else(|| {
                    Error::InvalidHeader(format!(
                        "invalid {name} `{}`",
                        String::from_utf8_lossy(token)
                    ))
                })
        };

        let width = header_value("width")?;
        let height = header_value("height")?;
        let max = header_value("maximum value")?;
        if max == 0 || max > u8::MAX as u32 {
            return Err(Error::InvalidHeader(format!("unsupported maximum value {max}")));
        }

        // Exactly one whitespace byte separates the header from the raster.
        let data = bytes.get(cursor + 1..).unwrap_or_default();
        let expected = width
            .checked_mul(height)
            .and_then(|count| count.checked_mul(3))
            .and_then(|bytes| usize::try_from(bytes).ok())
            .ok_or_else(|| {
                Error::InvalidHeader(format!("image of {width}x{height} is too large"))
            })?;
        if data.len() < expected {
            return Err(Error::Truncated {
                expected,
                got: data.len(),
            });
        }

        let scale = 1. / max as f32;
        let pixels = bytemuck::cast_slice::<u8, [u8; 3]>(&data[..expected])
            .iter()
            .map(|&[r, g, b]| Color::new(r as f32, g as f32, b as f32) * scale)
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Bilinear sample at normalized coordinates, clamped to the edges.
    ///
    /// An empty image samples as black.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if self.is_empty() {
            return Color::BLACK;
        }

        let x = (u * self.width as f32 - 0.5).clamp(0., (self.width - 1) as f32);
        let y = (v * self.height as f32 - 0.5).clamp(0., (self.height - 1) as f32);

        let (x0, y0) = (x.floor() as u32, y.floor() as u32);
        let (x1, y1) = ((x0 + 1).min(self.width - 1), (y0 + 1).min(self.height - 1));
        let (fx, fy) = (x - x0 as f32, y - y0 as f32);

        let texel = |x, y| self.pixels[(y * self.width + x) as usize];

        let top = texel(x0, y0) * (1. - fx) + texel(x1, y0) * fx;
        let bottom = texel(x0, y1) * (1. - fx) + texel(x1, y1) * fx;

        top * (1. - fy) + bottom * fy
    }
}

/// Next whitespace-separated header token, skipping `#` comments.
fn next_token<'a>(bytes: &'a [u8], cursor: &mut usize) -> Option<&'a [u8]> {
    loop {
        match bytes.get(*cursor)? {
            b'#' => {
                while bytes.get(*cursor).is_some_and(|&b| b != b'\n') {
                    *cursor += 1;
                }
            }
            b if b.is_ascii_whitespace() => *cursor += 1,
            _ => break,
        }
    }

    let start = *cursor;
    while bytes.get(*cursor).is_some_and(|b| !b.is_ascii_whitespace()) {
        *cursor += 1;
    }

    Some(&bytes[start..*cursor])
}
