//! Software render target: an [Image] plus a [View] mapping world coordinates onto it.

use crate::{
    color::Color,
    image::Image,
    primitives::Vertex,
    shader::{FlatColor, Fragment, Shader, Textured},
    vector::{Vec2, EPSILON},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How a shaded fragment is combined with the pixel already in the target.
pub enum BlendMode {
    /// `dst = src`
    #[default]
    Replace,
    /// `dst = dst + src`
    Add,
    /// `dst = dst * src`
    Multiply,
}

impl BlendMode {
    /// Combine `src` into `dst`, clamped to `[0, 1]`.
    pub fn apply(self, dst: Color, src: Color) -> Color {
        match self {
            BlendMode::Replace => src,
            BlendMode::Add => dst + src,
            BlendMode::Multiply => dst * src,
        }
        .clamp()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Rectangle of the world shown by a [Canvas], by center and size.
pub struct View {
    #[allow(missing_docs)]
    pub center: Vec2,
    #[allow(missing_docs)]
    pub size: Vec2,
}

impl View {
    #[allow(missing_docs)]
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// World position of the top-left corner.
    pub fn origin(&self) -> Vec2 {
        self.center - self.size / 2.
    }
}

#[derive(Clone, Debug, PartialEq)]
/// An off-screen render target.
pub struct Canvas {
    image: Image<Color>,
    view: View,
}

impl Canvas {
    /// Black canvas showing the world rectangle `(0, 0, width, height)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: Image::new(width, height, Color::BLACK),
            view: Self::default_view(width, height),
        }
    }

    /// One world unit per pixel, origin at the top-left corner.
    pub fn default_view(width: u32, height: u32) -> View {
        let size = Vec2::new(width as f32, height as f32);
        View::new(size / 2., size)
    }

    /// Reallocate for a new resolution, resetting the view.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    #[allow(missing_docs)]
    pub fn image(&self) -> &Image<Color> {
        &self.image
    }

    #[allow(missing_docs)]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[allow(missing_docs)]
    pub fn set_view(&mut self, view: View) {
        self.view = view;
    }

    #[allow(missing_docs)]
    pub fn width(&self) -> u32 {
        self.image.width
    }

    #[allow(missing_docs)]
    pub fn height(&self) -> u32 {
        self.image.height
    }

    #[allow(missing_docs)]
    pub fn clear(&mut self, color: Color) {
        self.image.fill(color);
    }

    #[allow(missing_docs)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get(x, y).copied()
    }

    /// World position to continuous pixel coordinates.
    pub fn world_to_pixel(&self, point: Vec2) -> Vec2 {
        let local = point - self.view.origin();
        Vec2::new(
            local.x() * self.image.width as f32 / self.view.size.x(),
            local.y() * self.image.height as f32 / self.view.size.y(),
        )
    }

    /// World position of a pixel's center.
    pub fn pixel_to_world(&self, x: u32, y: u32) -> Vec2 {
        let origin = self.view.origin();
        Vec2::new(
            origin.x() + (x as f32 + 0.5) * self.view.size.x() / self.image.width as f32,
            origin.y() + (y as f32 + 0.5) * self.view.size.y() / self.image.height as f32,
        )
    }

    /// Rasterize one triangle, shading every pixel whose center it covers.
    ///
    /// Degenerate (zero-area) triangles draw nothing.
    pub fn draw_triangle(&mut self, vertices: &[Vertex; 3], shader: &dyn Shader, blend: BlendMode) {
        if self.image.is_empty() {
            return;
        }

        let [a, b, c] = vertices.map(|vertex| self.world_to_pixel(vertex.position));
        let area = edge_function(a, b, c);
        if area.abs() < EPSILON {
            return;
        }

        let max_x = (self.image.width - 1) as f32;
        let max_y = (self.image.height - 1) as f32;
        let x0 = a.x().min(b.x()).min(c.x()).floor().clamp(0., max_x) as u32;
        let x1 = a.x().max(b.x()).max(c.x()).ceil().clamp(0., max_x) as u32;
        let y0 = a.y().min(b.y()).min(c.y()).floor().clamp(0., max_y) as u32;
        let y1 = a.y().max(b.y()).max(c.y()).ceil().clamp(0., max_y) as u32;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let weights = [
                    edge_function(b, c, p) / area,
                    edge_function(c, a, p) / area,
                    edge_function(a, b, p) / area,
                ];
                if weights.iter().any(|&w| w < 0.) {
                    continue;
                }

                let uv = vertices
                    .iter()
                    .zip(weights)
                    .fold(Vec2::default(), |acc, (vertex, w)| acc + vertex.uv * w);
                let color = vertices
                    .iter()
                    .zip(weights)
                    .map(|(vertex, w)| vertex.color * w)
                    .sum();

                let src = shader.fragment(&Fragment {
                    pixel: (x, y),
                    barycentric: weights,
                    uv,
                    color,
                });

                let index = (y * self.image.width + x) as usize;
                self.image.pixels[index] = blend.apply(self.image.pixels[index], src);
            }
        }
    }

    /// Fill a convex polygon given in world coordinates, fanning from its first point.
    pub fn draw_convex(&mut self, points: &[Vec2], shader: &dyn Shader, blend: BlendMode) {
        let Some((&first, rest)) = points.split_first() else {
            return;
        };

        for pair in rest.windows(2) {
            let triangle = [first, pair[0], pair[1]].map(|p| Vertex::new(p, Vec2::default()));
            self.draw_triangle(&triangle, shader, blend);
        }
    }

    /// Fill a convex polygon with a flat color.
    pub fn fill_convex(&mut self, points: &[Vec2], color: Color, blend: BlendMode) {
        self.draw_convex(points, &FlatColor(color), blend);
    }

    /// Draw `texture` stretched over the quad `corners` (top-left, top-right, bottom-right,
    /// bottom-left in texture space).
    pub fn draw_textured_quad(
        &mut self,
        corners: [Vec2; 4],
        texture: &Image<Color>,
        tint: Color,
        blend: BlendMode,
    ) {
        let uvs = [
            Vec2::new(0., 0.),
            Vec2::new(1., 0.),
            Vec2::new(1., 1.),
            Vec2::new(0., 1.),
        ];
        let vertex = |i: usize| Vertex::new(corners[i], uvs[i]);
        let shader = Textured { texture, tint };

        self.draw_triangle(&[vertex(0), vertex(1), vertex(2)], &shader, blend);
        self.draw_triangle(&[vertex(0), vertex(2), vertex(3)], &shader, blend);
    }

    /// Composite another buffer pixel by pixel, over the overlapping area.
    pub fn draw_image(&mut self, image: &Image<Color>, blend: BlendMode) {
        let width = self.image.width.min(image.width);
        let height = self.image.height.min(image.height);

        for y in 0..height {
            for x in 0..width {
                let src = image.pixels[(y * image.width + x) as usize];
                let index = (y * self.image.width + x) as usize;
                self.image.pixels[index] = blend.apply(self.image.pixels[index], src);
            }
        }
    }
}

/// Twice the signed area of `(a, b, p)`.
fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x() - a.x()) * (p.y() - a.y()) - (b.y() - a.y()) * (p.x() - a.x())
}

#[cfg(test)]
mod test {
    use float_eq::assert_float_eq;

    use super::*;

    fn square(left: f32, top: f32, size: f32) -> [Vec2; 4] {
        [
            Vec2::new(left, top),
            Vec2::new(left + size, top),
            Vec2::new(left + size, top + size),
            Vec2::new(left, top + size),
        ]
    }

    #[test]
    fn blend_modes() {
        let dst = Color::gray(0.5);
        let src = Color::gray(0.8);

        assert_eq!(src, BlendMode::Replace.apply(dst, src));
        assert_eq!(Color::WHITE, BlendMode::Add.apply(dst, src));
        assert_float_eq!(BlendMode::Multiply.apply(dst, src).g, 0.4, abs <= 0.000_1);
    }

    #[test]
    fn convex_fill_covers_pixel_centers() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_convex(&square(2., 2., 4.), Color::WHITE, BlendMode::Replace);

        assert_eq!(Some(Color::WHITE), canvas.pixel(2, 2));
        assert_eq!(Some(Color::WHITE), canvas.pixel(5, 5));
        assert_eq!(Some(Color::BLACK), canvas.pixel(6, 5));
        assert_eq!(Some(Color::BLACK), canvas.pixel(1, 3));
    }

    #[test]
    fn winding_does_not_matter() {
        let mut canvas = Canvas::new(10, 10);
        let mut points = square(0., 0., 10.);
        points.reverse();
        canvas.fill_convex(&points, Color::gray(0.5), BlendMode::Replace);

        assert!(canvas
            .image()
            .pixels
            .iter()
            .all(|&pixel| pixel == Color::gray(0.5)));
    }

    #[test]
    fn view_mapping() {
        let mut canvas = Canvas::new(10, 10);
        canvas.set_view(View::new(Vec2::new(0., 0.), Vec2::new(20., 20.)));

        let pixel = canvas.world_to_pixel(Vec2::new(0., 0.));
        assert_float_eq!(pixel.x(), 5., abs <= 0.000_1);
        assert_float_eq!(pixel.y(), 5., abs <= 0.000_1);

        let world = canvas.pixel_to_world(0, 9);
        assert_float_eq!(world.x(), -9., abs <= 0.000_1);
        assert_float_eq!(world.y(), 9., abs <= 0.000_1);

        canvas.fill_convex(&square(-10., -10., 10.), Color::WHITE, BlendMode::Replace);
        assert_eq!(Some(Color::WHITE), canvas.pixel(4, 4));
        assert_eq!(Some(Color::BLACK), canvas.pixel(5, 5));
    }

    #[test]
    fn textured_quad_and_composite() {
        let mut texture = Image::new(2, 1, Color::BLACK);
        texture.set(1, 0, Color::WHITE);

        let mut canvas = Canvas::new(4, 4);
        canvas.draw_textured_quad(
            square(0., 0., 4.),
            &texture,
            Color::WHITE,
            BlendMode::Replace,
        );
        assert_eq!(Some(Color::BLACK), canvas.pixel(0, 2));
        assert_eq!(Some(Color::WHITE), canvas.pixel(3, 2));

        let mut target = Canvas::new(4, 4);
        target.clear(Color::gray(0.5));
        target.draw_image(canvas.image(), BlendMode::Multiply);
        assert_eq!(Some(Color::BLACK), target.pixel(0, 0));
        assert_eq!(Some(Color::gray(0.5)), target.pixel(3, 0));
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let mut canvas = Canvas::new(4, 4);
        let line = [0., 1., 2.].map(|t| Vertex::new(Vec2::new(t, t), Vec2::default()));
        canvas.draw_triangle(&line, &FlatColor(Color::WHITE), BlendMode::Replace);

        assert!(canvas.image().pixels.iter().all(|&pixel| pixel == Color::BLACK));
    }
}
