//! Point lights and their sprite footprint.

use std::{path::Path, sync::Arc};

use crate::{
    canvas::{BlendMode, Canvas},
    color::{Color, Color8},
    image::Image,
    matrix::Transform,
    occluder::Occluder,
    penumbra::{PenumbraSolver, Silhouette},
    rect::FloatRect,
    vector::Vec2,
};

/// Area-light radius of a fresh light.
pub const DEFAULT_RADIUS: f32 = 10.;
/// Shadow quads reach this many times the light's width plus height.
pub const DEFAULT_SHADOW_EXTENSION_MULTIPLIER: f32 = 1.4;
/// Side of the generated default light texture, in pixels.
pub const DEFAULT_TEXTURE_SIZE: u32 = 128;

lazy_static::lazy_static! {
    /// Radial falloff shared by every light that was not given a texture.
    pub static ref DEFAULT_LIGHT_TEXTURE: Arc<Image<Color>> =
        Arc::new(radial_falloff(DEFAULT_TEXTURE_SIZE));
}

/// White in the middle, fading quadratically to black at the inscribed circle.
pub fn radial_falloff(size: u32) -> Image<Color> {
    let mut image = Image::new(size, size, Color::BLACK);
    let half = size as f32 / 2.;

    for y in 0..size {
        for x in 0..size {
            let offset = Vec2::new(x as f32 + 0.5 - half, y as f32 + 0.5 - half);
            let falloff = (1. - offset.len() / half).max(0.);
            image.set(x, y, Color::gray(falloff * falloff));
        }
    }

    image
}

#[derive(Clone, Debug, PartialEq)]
/// Textured quad with SFML-like placement: the texture's `origin` sits at `position`, then the
/// texture is scaled around it.
pub struct Sprite {
    texture: Arc<Image<Color>>,
    /// Position of the origin in the owning entity's frame.
    pub position: Vec2,
    #[allow(missing_docs)]
    pub scale: Vec2,
    /// Anchor in texture pixels.
    pub origin: Vec2,
    /// Tint applied to the texture.
    pub color: Color8,
}

impl Sprite {
    /// Sprite anchored on the center of `texture`.
    pub fn new(texture: Arc<Image<Color>>) -> Self {
        let origin = Vec2::new(texture.width as f32, texture.height as f32) / 2.;
        Self {
            texture,
            position: Vec2::default(),
            scale: Vec2::new(1., 1.),
            origin,
            color: Color8::WHITE,
        }
    }

    #[allow(missing_docs)]
    pub fn texture(&self) -> &Image<Color> {
        &self.texture
    }

    /// Swap the texture and re-center the origin.
    pub fn set_texture(&mut self, texture: Arc<Image<Color>>) {
        self.origin = Vec2::new(texture.width as f32, texture.height as f32) / 2.;
        self.texture = texture;
    }

    /// Texture space to the owning entity's frame.
    pub fn transform(&self) -> Transform {
        Transform::default()
            .translate(self.position)
            .scale(self.scale)
            .translate(-self.origin)
    }

    /// Texture rectangle in texture pixels.
    pub fn local_bounds(&self) -> FloatRect {
        FloatRect::new(0., 0., self.texture.width as f32, self.texture.height as f32)
    }

    /// Bounds in the owning entity's frame.
    pub fn bounds(&self) -> FloatRect {
        self.transform().transform_rect(&self.local_bounds())
    }

    /// Quad corners after `parent`, in texture order.
    pub fn corners(&self, parent: &Transform) -> [Vec2; 4] {
        let transform = parent.combine(&self.transform());
        self.local_bounds()
            .corners()
            .map(|corner| transform.transform_point(corner))
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A light emitting from a disk around its source point.
///
/// The sprite is the visible footprint and the reach of the light; the source point, given
/// relative to the sprite origin before scaling, is where shadows are cast from.
pub struct PointLight {
    sprite: Sprite,
    source_point: Vec2,
    radius: f32,
    shadow_extension_multiplier: f32,
    active: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self::with_texture(DEFAULT_LIGHT_TEXTURE.clone())
    }
}

activatable!(PointLight);

impl PointLight {
    /// Light using the shared default texture.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn with_texture(texture: Arc<Image<Color>>) -> Self {
        Self {
            sprite: Sprite::new(texture),
            source_point: Vec2::default(),
            radius: DEFAULT_RADIUS,
            shadow_extension_multiplier: DEFAULT_SHADOW_EXTENSION_MULTIPLIER,
            active: true,
        }
    }

    /// Replace the texture with a PPM file.
    ///
    /// A file that cannot be loaded leaves the light with an empty footprint: it still exists
    /// but emits nothing.
    pub fn load_texture(&mut self, path: &Path) {
        let texture = match Image::load_ppm(path) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!(
                    "Could not load light texture {}: {err}, light will be invisible",
                    path.display()
                );
                Image::new(0, 0, Color::BLACK)
            }
        };

        self.sprite.set_texture(Arc::new(texture));
    }

    #[allow(missing_docs)]
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    #[allow(missing_docs)]
    pub fn color(&self) -> Color8 {
        self.sprite.color
    }

    #[allow(missing_docs)]
    pub fn set_color(&mut self, color: Color8) {
        self.sprite.color = color;
    }

    #[allow(missing_docs)]
    pub fn scale(&self) -> Vec2 {
        self.sprite.scale
    }

    #[allow(missing_docs)]
    pub fn set_scale(&mut self, scale: Vec2) {
        self.sprite.scale = scale;
    }

    /// Local position of the sprite origin.
    pub fn position(&self) -> Vec2 {
        self.sprite.position
    }

    #[allow(missing_docs)]
    pub fn set_position(&mut self, position: Vec2) {
        self.sprite.position = position;
    }

    /// Shift the local position.
    pub fn move_by(&mut self, offset: Vec2) {
        self.sprite.position += offset;
    }

    #[allow(missing_docs)]
    pub fn source_point(&self) -> Vec2 {
        self.source_point
    }

    /// Emission point relative to the sprite origin, in unscaled texture units.
    pub fn set_source_point(&mut self, source_point: Vec2) {
        self.source_point = source_point;
    }

    #[allow(missing_docs)]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Disk radius, clamped to be non-negative.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.);
    }

    #[allow(missing_docs)]
    pub fn shadow_extension_multiplier(&self) -> f32 {
        self.shadow_extension_multiplier
    }

    #[allow(missing_docs)]
    pub fn set_shadow_extension_multiplier(&mut self, multiplier: f32) {
        self.shadow_extension_multiplier = multiplier;
    }

    /// Sprite bounds in the owning entity's frame.
    pub fn bounding_box(&self) -> FloatRect {
        self.sprite.bounds()
    }

    /// Bounds in world space.
    pub fn world_bounds(&self, light_transform: &Transform) -> FloatRect {
        light_transform.transform_rect(&self.bounding_box())
    }

    /// Source point in the owning entity's frame.
    pub fn cast_center(&self) -> Vec2 {
        self.sprite
            .transform()
            .translate(self.sprite.origin)
            .transform_point(self.source_point)
    }

    /// How far shadow geometry is projected from the occluder.
    pub fn shadow_extension(&self) -> f32 {
        let bounds = self.bounding_box();
        self.shadow_extension_multiplier * (bounds.width + bounds.height)
    }

    /// Silhouette of `occluder` as seen from this light, in world space.
    ///
    /// Returns `None` without running the solver when the occluder's bounds miss the light's.
    pub fn silhouette(
        &self,
        light_transform: &Transform,
        occluder: &Occluder,
        occluder_transform: &Transform,
    ) -> Option<Silhouette> {
        if !occluder
            .world_bounds(occluder_transform)
            .intersects(&self.world_bounds(light_transform))
        {
            return None;
        }

        let center = light_transform.transform_point(self.cast_center());
        let solver = PenumbraSolver::new(center, self.radius);
        Some(solver.solve(&occluder.world_points(occluder_transform)))
    }

    /// Draw the unoccluded footprint.
    pub fn render_emission(
        &self,
        canvas: &mut Canvas,
        light_transform: &Transform,
        blend: BlendMode,
    ) {
        canvas.draw_textured_quad(
            self.sprite.corners(light_transform),
            self.sprite.texture(),
            self.sprite.color.into(),
            blend,
        );
    }
}

#[cfg(test)]
mod test {
    use float_eq::assert_float_eq;

    use super::*;

    fn flat_light(size: u32) -> PointLight {
        PointLight::with_texture(Arc::new(Image::new(size, size, Color::WHITE)))
    }

    #[test]
    fn footprint_and_cast_center() {
        let mut light = flat_light(20);
        light.set_position(Vec2::new(100., 50.));
        light.set_scale(Vec2::new(2., 2.));
        light.set_source_point(Vec2::new(3., 0.));

        assert_eq!(FloatRect::new(80., 30., 40., 40.), light.bounding_box());
        assert_eq!(Vec2::new(106., 50.), light.cast_center());
        assert_float_eq!(light.shadow_extension(), 1.4 * 80., abs <= 0.001);
    }

    #[test]
    fn occluders_out_of_reach_are_rejected() {
        let mut light = flat_light(20);
        light.set_radius(1.);
        let occluder = Occluder::new(vec![
            Vec2::new(0., 0.),
            Vec2::new(2., 0.),
            Vec2::new(2., 2.),
            Vec2::new(0., 2.),
        ]);

        let far = Transform::default().translate(Vec2::new(100., 100.));
        assert_eq!(None, light.silhouette(&Transform::default(), &occluder, &far));

        let near = Transform::default().translate(Vec2::new(-1., 5.));
        let silhouette = light
            .silhouette(&Transform::default(), &occluder, &near)
            .expect("occluder in reach");
        assert!(silhouette.is_valid());
    }

    #[test]
    fn missing_texture_gives_empty_footprint() {
        let mut light = PointLight::new();
        assert_eq!(DEFAULT_TEXTURE_SIZE, light.sprite().texture().width);

        light.load_texture(Path::new("/definitely/not/here.ppm"));
        assert!(light.sprite().texture().is_empty());
        assert_eq!(FloatRect::default(), light.bounding_box());

        let mut canvas = Canvas::new(8, 8);
        light.render_emission(&mut canvas, &Transform::default(), BlendMode::Add);
        assert!(canvas.image().pixels.iter().all(|&pixel| pixel == Color::BLACK));
    }

    #[test]
    fn default_texture_falls_off() {
        let texture = &*DEFAULT_LIGHT_TEXTURE;
        let center = texture.get(64, 64).map(|c| c.r).unwrap_or_default();
        let edge = texture.get(0, 64).map(|c| c.r).unwrap_or(1.);

        assert!(center > 0.95);
        assert_float_eq!(edge, 0., abs <= 0.001);
    }

    #[test]
    fn radius_is_never_negative() {
        let mut light = PointLight::new();
        light.set_radius(-3.);
        assert_eq!(0., light.radius());
    }
}
