#![warn(missing_docs)]

//! 2D soft shadows for point lights occluded by convex polygons.
//!
//! Lights and their occluders live in a host [world](world::LightWorld). Every frame the
//! [LightSystem](system::LightSystem) renders each light into a software light buffer, carves
//! umbra and penumbra regions out of it, accumulates the results over an ambient color and
//! multiplies the composition over the target canvas.

macro_rules! activatable {
    ($($target:ty),+ $(,)?) => {
        $(
            impl $target {
                /// Enable or disable the component. Inactive components are skipped entirely.
                pub fn set_active(&mut self, active: bool) {
                    self.active = active;
                }

                #[allow(missing_docs)]
                pub fn is_active(&self) -> bool {
                    self.active
                }

                #[allow(missing_docs)]
                pub fn toggle_active(&mut self) {
                    self.active = !self.active;
                }
            }
        )+
    };
}

pub mod affector;
pub mod canvas;
pub mod color;
pub mod config;
pub mod image;
pub mod light;
pub mod matrix;
pub mod occluder;
pub mod penumbra;
pub mod pipeline;
pub mod primitives;
pub mod raycasting;
pub mod rect;
pub mod shader;
pub mod system;
pub mod vector;
pub mod world;

/// Types needed to set up and render a scene.
pub mod prelude {
    pub use crate::{
        affector::{LightAffect, LightAffector, LightFlickering, RandomizedFlickering},
        canvas::{BlendMode, Canvas, View},
        color::{Color, Color8},
        config::LightSystemConfig,
        image::Image,
        light::PointLight,
        matrix::Transform,
        occluder::Occluder,
        rect::{FloatRect, IntRect},
        system::LightSystem,
        vector::Vec2,
        world::{Entity, LightEmitter, LightWorld, Multi, ShadowEmitter, SpatialIndex, World},
    };
}
