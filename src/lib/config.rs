//! Light system settings.

use std::path::PathBuf;

use crate::color::Color8;

#[derive(Clone, Debug, PartialEq)]
/// Settings read once when a [LightSystem](crate::system::LightSystem) is created.
pub struct LightSystemConfig {
    /// Size of the render buffers, normally the output resolution.
    pub image_size: (u32, u32),
    /// PPM lookup texture for the penumbra gradient, the analytic gradient is used without one.
    pub penumbra_texture: Option<PathBuf>,
    /// Ambient color the frame starts from.
    pub ambient_color: Color8,
}

impl Default for LightSystemConfig {
    fn default() -> Self {
        Self {
            image_size: (800, 600),
            penumbra_texture: None,
            ambient_color: Color8::WHITE,
        }
    }
}

impl LightSystemConfig {
    #[allow(missing_docs)]
    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image_size = (width, height);
        self
    }

    #[allow(missing_docs)]
    pub fn with_penumbra_texture(mut self, path: impl Into<PathBuf>) -> Self {
        self.penumbra_texture = Some(path.into());
        self
    }

    #[allow(missing_docs)]
    pub fn with_ambient_color(mut self, color: Color8) -> Self {
        self.ambient_color = color;
        self
    }
}
