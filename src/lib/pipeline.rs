//! Per-light render passes and the frame composition buffer.
//!
//! Every light goes through the same passes: its footprint is drawn into a private light
//! buffer, occluders over-mask it, penumbra wedges give the soft edges back, occluders are
//! overlaid once more and the result is added into the composition buffer. Once every light is
//! done the composition buffer, seeded with the ambient color, multiplies the final frame.

use std::{path::Path, sync::Arc};

use crate::{
    canvas::{BlendMode, Canvas, View},
    color::Color,
    image::Image,
    light::PointLight,
    matrix::Transform,
    occluder::Occluder,
    penumbra::Penumbra,
    primitives::Vertex,
    raycasting::Ray,
    shader::{LightOverShape, Unshadow},
    vector::Vec2,
};

#[derive(Clone, Debug)]
/// Render targets reused across frames, all sized to the output image.
pub struct RenderPipeline {
    light: Canvas,
    emission: Canvas,
    antumbra: Canvas,
    composition: Canvas,
    penumbra_texture: Option<Arc<Image<Color>>>,
}

impl RenderPipeline {
    /// Buffers for a `width` x `height` output, without penumbra texture.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            light: Canvas::new(width, height),
            emission: Canvas::new(width, height),
            antumbra: Canvas::new(width, height),
            composition: Canvas::new(width, height),
            penumbra_texture: None,
        }
    }

    /// Reallocate every buffer, on resolution change.
    pub fn set_image_size(&mut self, width: u32, height: u32) {
        for canvas in [
            &mut self.light,
            &mut self.emission,
            &mut self.antumbra,
            &mut self.composition,
        ] {
            canvas.resize(width, height);
        }
    }

    #[allow(missing_docs)]
    pub fn image_size(&self) -> (u32, u32) {
        (self.composition.width(), self.composition.height())
    }

    /// Lookup texture shaping the penumbra gradient, `None` for the analytic gradient.
    pub fn set_penumbra_texture(&mut self, texture: Option<Arc<Image<Color>>>) {
        self.penumbra_texture = texture;
    }

    #[allow(missing_docs)]
    pub fn penumbra_texture(&self) -> Option<&Image<Color>> {
        self.penumbra_texture.as_deref()
    }

    /// Load the penumbra lookup texture, falling back to the analytic gradient on failure.
    pub fn load_penumbra_texture(&mut self, path: &Path) {
        self.penumbra_texture = match Image::load_ppm(path) {
            Ok(texture) => Some(Arc::new(texture)),
            Err(err) => {
                log::warn!(
                    "No valid penumbra texture loaded from {}: {err}, using plain gradient",
                    path.display()
                );
                None
            }
        };
    }

    /// Light buffer of the last rendered light.
    pub fn light_buffer(&self) -> &Canvas {
        &self.light
    }

    /// Unoccluded footprint of the last rendered light.
    pub fn emission_buffer(&self) -> &Canvas {
        &self.emission
    }

    #[allow(missing_docs)]
    pub fn composition(&self) -> &Canvas {
        &self.composition
    }

    /// Seed the composition buffer with the ambient color.
    pub fn begin_frame(&mut self, ambient: Color) {
        let (width, height) = self.image_size();
        self.composition
            .set_view(Canvas::default_view(width, height));
        self.composition.clear(ambient);
    }

    /// Render one light against the occluders in its reach and add it to the composition.
    pub fn render_light(
        &mut self,
        view: &View,
        light: &PointLight,
        light_transform: &Transform,
        colliders: &[(&Occluder, &Transform)],
    ) {
        let shadow_extension = light.shadow_extension();
        let penumbra_texture = self.penumbra_texture.as_deref();

        for canvas in [&mut self.light, &mut self.emission] {
            canvas.set_view(*view);
            canvas.clear(Color::BLACK);
            light.render_emission(canvas, light_transform, BlendMode::Add);
        }

        // Over-mask first, penumbras and antumbras give light back afterwards.
        for &(occluder, occluder_transform) in colliders {
            if !occluder.is_active() {
                continue;
            }

            let Some(silhouette) = light.silhouette(light_transform, occluder, occluder_transform)
            else {
                continue;
            };

            if !silhouette.is_valid() {
                log::debug!(
                    "Degenerate silhouette ({} inner, {} outer boundaries), occluder drawn opaque",
                    silhouette.inner.len(),
                    silhouette.outer.len()
                );
                // The overlay pass below draws it opaque.
                continue;
            }

            let points = occluder.world_points(occluder_transform);
            if !occluder.light_over_shape() {
                self.light
                    .fill_convex(&points, Color::BLACK, BlendMode::Replace);
            }

            let outer_a = Ray::new(
                points[silhouette.outer[0].index],
                silhouette.outer_vectors[0],
            );
            let outer_b = Ray::new(
                points[silhouette.outer[1].index],
                silhouette.outer_vectors[1],
            );

            if outer_a.intersect(&outer_b).is_some() {
                let inner_a = Ray::new(
                    points[silhouette.inner[0].index],
                    silhouette.inner_vectors[0],
                );
                let inner_b = Ray::new(
                    points[silhouette.inner[1].index],
                    silhouette.inner_vectors[1],
                );

                self.antumbra.set_view(*view);
                self.antumbra.clear(Color::WHITE);

                let mask = match inner_a.intersect(&inner_b) {
                    Some(apex) => vec![*inner_a.start(), *inner_b.start(), apex],
                    None => extended_quad(&inner_a, &inner_b, shadow_extension),
                };
                self.antumbra
                    .fill_convex(&mask, Color::BLACK, BlendMode::Replace);

                unmask_with_penumbras(
                    &mut self.antumbra,
                    &silhouette.penumbras,
                    shadow_extension,
                    penumbra_texture,
                    BlendMode::Add,
                );

                self.light
                    .draw_image(self.antumbra.image(), BlendMode::Multiply);
            } else {
                let mask = extended_quad(&outer_a, &outer_b, shadow_extension);
                self.light
                    .fill_convex(&mask, Color::BLACK, BlendMode::Replace);

                unmask_with_penumbras(
                    &mut self.light,
                    &silhouette.penumbras,
                    shadow_extension,
                    penumbra_texture,
                    BlendMode::Multiply,
                );
            }
        }

        // Light-over-shape surfaces show the emission, every other surface stays dark.
        for &(occluder, occluder_transform) in colliders {
            if !occluder.is_active() {
                continue;
            }

            let fill = if occluder.light_over_shape() {
                Color::WHITE
            } else {
                Color::BLACK
            };
            let shader = LightOverShape {
                emission: self.emission.image(),
                fill,
            };
            self.light.draw_convex(
                &occluder.world_points(occluder_transform),
                &shader,
                BlendMode::Replace,
            );
        }

        self.composition
            .draw_image(self.light.image(), BlendMode::Add);
    }

    /// Multiply the composed light over `target`.
    pub fn finish(&self, target: &mut Canvas) {
        target.draw_image(self.composition.image(), BlendMode::Multiply);
    }
}

/// Quad spanned by two rays, cut at `extension` along each.
fn extended_quad(a: &Ray, b: &Ray, extension: f32) -> Vec<Vec2> {
    vec![*a.start(), *b.start(), b.calc(extension), a.calc(extension)]
}

/// Draw every penumbra wedge as a triangle shaded from its light to its dark brightness.
pub fn unmask_with_penumbras(
    canvas: &mut Canvas,
    penumbras: &[Penumbra],
    shadow_extension: f32,
    penumbra_texture: Option<&Image<Color>>,
    blend: BlendMode,
) {
    for penumbra in penumbras {
        let shader = Unshadow {
            penumbra_texture,
            light_brightness: penumbra.light_brightness,
            dark_brightness: penumbra.dark_brightness,
        };

        let vertices = [
            Vertex::new(penumbra.source, Vec2::new(0., 1.)),
            Vertex::new(
                penumbra.source + penumbra.light_edge.normalize() * shadow_extension,
                Vec2::new(1., 0.),
            ),
            Vertex::new(
                penumbra.source + penumbra.dark_edge.normalize() * shadow_extension,
                Vec2::new(0., 0.),
            ),
        ];
        canvas.draw_triangle(&vertices, &shader, blend);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Color8;

    fn flat_light(position: Vec2, radius: f32) -> PointLight {
        let mut light = PointLight::with_texture(Arc::new(Image::new(200, 200, Color::WHITE)));
        light.set_position(position);
        light.set_radius(radius);
        light
    }

    fn rect(left: f32, top: f32, right: f32, bottom: f32) -> Occluder {
        Occluder::new(vec![
            Vec2::new(left, top),
            Vec2::new(right, top),
            Vec2::new(right, bottom),
            Vec2::new(left, bottom),
        ])
    }

    fn render(light: &PointLight, occluder: &Occluder) -> RenderPipeline {
        let mut pipeline = RenderPipeline::new(100, 100);
        let identity = Transform::default();

        pipeline.begin_frame(Color::BLACK);
        pipeline.render_light(
            &Canvas::default_view(100, 100),
            light,
            &identity,
            &[(occluder, &identity)],
        );
        pipeline
    }

    fn brightness(canvas: &Canvas, x: u32, y: u32) -> f32 {
        canvas.pixel(x, y).map(|color| color.r).unwrap_or(-1.)
    }

    #[test]
    fn wide_occluder_casts_umbra() {
        let light = flat_light(Vec2::new(50., 5.), 2.);
        let occluder = rect(40., 30., 60., 40.);
        let pipeline = render(&light, &occluder);
        let composed = pipeline.composition();

        assert_eq!(0., brightness(composed, 50, 80));
        assert_eq!(0., brightness(composed, 50, 35));
        assert_eq!(1., brightness(composed, 5, 80));
        assert_eq!(1., brightness(composed, 50, 20));
    }

    #[test]
    fn narrow_occluder_lets_antumbra_through() {
        let light = flat_light(Vec2::new(50., 10.), 10.);
        let occluder = rect(48., 30., 52., 34.);
        let pipeline = render(&light, &occluder);
        let composed = pipeline.composition();

        let antumbra = brightness(composed, 50, 90);
        assert!(0.3 < antumbra && antumbra < 0.95, "antumbra brightness {antumbra}");
        assert!(brightness(composed, 50, 37) < 0.05);
        assert_eq!(1., brightness(composed, 5, 90));
    }

    #[test]
    fn light_over_shape_shows_emission() {
        let mut light = flat_light(Vec2::new(50., 5.), 2.);
        light.set_color(Color8::new(128, 128, 128));
        let mut occluder = rect(40., 30., 60., 40.);
        occluder.set_light_over_shape(true);

        let pipeline = render(&light, &occluder);
        let inside = brightness(pipeline.light_buffer(), 50, 35);
        let emitted = brightness(pipeline.emission_buffer(), 50, 35);

        assert!(emitted > 0.4);
        assert_eq!(emitted, inside);
        assert_eq!(0., brightness(pipeline.light_buffer(), 50, 80));
    }

    #[test]
    fn inactive_occluder_is_ignored() {
        let light = flat_light(Vec2::new(50., 5.), 2.);
        let mut occluder = rect(40., 30., 60., 40.);
        occluder.set_active(false);

        let pipeline = render(&light, &occluder);
        assert_eq!(1., brightness(pipeline.composition(), 50, 80));
    }

    #[test]
    fn ambient_and_finish() {
        let mut pipeline = RenderPipeline::new(4, 4);
        pipeline.begin_frame(Color::gray(0.5));

        let mut target = Canvas::new(4, 4);
        target.clear(Color::WHITE);
        pipeline.finish(&mut target);

        assert_eq!(Some(Color::gray(0.5)), target.pixel(2, 2));
    }

    #[test]
    fn degenerate_silhouette_stays_opaque() {
        // From inside the occluder every edge faces the light, so no boundary is found.
        let light = flat_light(Vec2::new(50., 50.), 2.);
        let occluder = rect(40., 40., 60., 60.);
        let pipeline = render(&light, &occluder);
        let composed = pipeline.composition();

        assert_eq!(0., brightness(composed, 50, 50));
        assert_eq!(1., brightness(composed, 5, 5));
        assert_eq!(1., brightness(composed, 50, 90));
    }

    #[test]
    fn shadow_quad_follows_boundary_rays() {
        let a = Ray::new(Vec2::new(0., 0.), Vec2::new(0., 3.));
        let b = Ray::new(Vec2::new(4., 0.), Vec2::new(4., 4.));
        let quad = extended_quad(&a, &b, 10.);

        assert_eq!(Vec2::new(0., 0.), quad[0]);
        assert_eq!(Vec2::new(4., 0.), quad[1]);
        assert!((quad[2] - Vec2::new(4. + 50f32.sqrt(), 50f32.sqrt())).len() < 0.000_1);
        assert_eq!(Vec2::new(0., 10.), quad[3]);
    }

    #[test]
    fn resizing() {
        let mut pipeline = RenderPipeline::new(4, 4);
        pipeline.set_image_size(8, 2);
        assert_eq!((8, 2), pipeline.image_size());
        assert_eq!(8, pipeline.light_buffer().width());
    }

    #[test]
    fn missing_penumbra_texture_falls_back() {
        let mut pipeline = RenderPipeline::new(4, 4);
        pipeline.load_penumbra_texture(Path::new("/definitely/not/here.ppm"));
        assert!(pipeline.penumbra_texture().is_none());
    }
}
