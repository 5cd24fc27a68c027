//! Scene configuration.
//!
//! Every tunable of the scene lives here. Defaults give the stock pink and
//! blue heart; a JSON file may override any subset of fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::error::ConfigError;
use crate::spawn::{ParticleField, MAX_PARTICLES};

/// Complete scene configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub text: TextConfig,
    pub font: FontConfig,
    pub bloom: BloomConfig,
    /// Scene spin about Y in radians per second.
    pub rotation_speed: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            particles: ParticleConfig::default(),
            text: TextConfig::default(),
            font: FontConfig::default(),
            bloom: BloomConfig::default(),
            rotation_speed: 0.25,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "heartfield".into(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the orbit target.
    pub distance: f32,
    /// Orbit drag sensitivity; 1.0 turns a full window-height drag into a full turn.
    pub rotate_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y: 60.0,
            near: 1.0,
            far: 1000.0,
            distance: 150.0,
            rotate_speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub field: ParticleField,
    /// Sprite size factor fed to the point-size formula.
    pub size: f32,
    pub color_start: Color,
    pub color_end: Color,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            field: ParticleField::default(),
            size: 0.9,
            color_start: Color::from_hex(0xfc466b),
            color_end: Color::from_hex(0x3f5efb),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Text to extrude; empty disables the title.
    pub content: String,
    /// Glyph em size in world units.
    pub size: f32,
    /// Extrusion depth.
    pub depth: f32,
    /// Straight segments per outline curve.
    pub curve_segments: u32,
    pub color_start: Color,
    pub color_end: Color,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content: "I Love Kim Chi".into(),
            size: 3.0,
            depth: 1.0,
            curve_segments: 12,
            color_start: Color::from_hex(0xff5e7f),
            color_end: Color::from_hex(0x5975ff),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FontConfig {
    /// Typeface JSON file.
    pub path: PathBuf,
    /// Extra attempts after a retryable load failure.
    pub retries: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("droid_serif_regular.typeface.json"),
            retries: 1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloomConfig {
    pub strength: f32,
    /// Blend between fine and coarse mips, 0..1.
    pub radius: f32,
    /// Luminance above which pixels glow.
    pub threshold: f32,
    /// Linear tone-mapping exposure.
    pub exposure: f32,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            strength: 1.6,
            radius: 0.1,
            threshold: 0.1,
            exposure: 1.5,
        }
    }
}

impl SceneConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: SceneConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| -> Result<(), ConfigError> { Err(ConfigError::Invalid(msg.into())) };

        if self.window.width == 0 || self.window.height == 0 {
            return invalid("window size must be non-zero");
        }
        match self.particles.field.particle_count() {
            Some(0) => return invalid("particle field must contain at least one particle"),
            Some(n) if n <= MAX_PARTICLES => {}
            _ => return invalid(&format!("particle field exceeds {MAX_PARTICLES} particles")),
        }
        if self.particles.field.extent <= 0.0 {
            return invalid("particle extent must be positive");
        }
        let speeds = &self.particles.field.speed_range;
        if speeds.start.partial_cmp(&speeds.end) != Some(std::cmp::Ordering::Less) {
            return invalid("speed range must be non-empty");
        }
        if self.particles.size <= 0.0 {
            return invalid("particle size must be positive");
        }
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return invalid("camera clip planes must satisfy 0 < near < far");
        }
        if !(self.camera.fov_y > 0.0 && self.camera.fov_y < 180.0) {
            return invalid("camera fov must be between 0 and 180 degrees");
        }
        if self.text.size <= 0.0 || self.text.depth < 0.0 {
            return invalid("text size must be positive and depth non-negative");
        }
        if self.text.curve_segments == 0 {
            return invalid("text curve segments must be at least 1");
        }
        if self.bloom.strength < 0.0 || self.bloom.exposure <= 0.0 {
            return invalid("bloom strength must be non-negative and exposure positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        SceneConfig::default().validate().unwrap();
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let mut config = SceneConfig::default();
        config.text.content = "hello".into();
        config.particles.field.seed = Some(99);
        config.save(&path).unwrap();

        let loaded = SceneConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r##"{ "bloom": { "strength": 2.0 }, "text": { "color_start": "#000000" } }"##)
                .unwrap();
        assert_eq!(config.bloom.strength, 2.0);
        assert_eq!(config.bloom.exposure, 1.5);
        assert_eq!(config.text.color_start, Color::from_hex(0));
        assert_eq!(config.text.content, "I Love Kim Chi");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = SceneConfig::default();
        config.particles.field.density = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SceneConfig::default();
        config.camera.near = 0.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.particles.field.speed_range = 5.0..5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_fields() {
        let config: SceneConfig = serde_json::from_str(
            r#"{ "particles": { "field": { "x_size": 100000, "y_size": 100000, "z_size": 1, "density": 1 } } }"#,
        )
        .unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        // Fits in u32 but not in the vertex buffer.
        let mut config = SceneConfig::default();
        config.particles.field.x_size = 4096;
        config.particles.field.y_size = 4096;
        config.particles.field.z_size = 1;
        config.particles.field.density = 2;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.particles.field.density = 1;
        assert_eq!(config.particles.field.particle_count(), Some(MAX_PARTICLES));
        config.validate().unwrap();
    }

    #[test]
    fn test_load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(SceneConfig::load(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            SceneConfig::load(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
