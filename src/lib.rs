//! # heartfield
//!
//! A pulsating particle heart rendered with wgpu.
//!
//! A quarter of a million random points are scattered through a cube. Every
//! frame the vertex shader pulls each point onto an implicit heart surface
//! whose radius beats with time, drops the ones that stray from a thin shell,
//! and colours the rest with a two-colour gradient. Extruded title text
//! breathes with the same pulse, the scene slowly spins, the camera orbits on
//! drag, and a bloom pass makes everything glow.
//!
//! ## Quick Start
//!
//! ```ignore
//! use heartfield::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     Scene::new()
//!         .with_text("I Love Kim Chi")
//!         .with_font("droid_serif_regular.typeface.json")
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### The heart field
//!
//! [`heart::pulse_radius`] gives the beating radius `r(t)`, and
//! [`heart::displace`] moves a point along its direction from the origin until
//! it sits on the surface of that radius. The same functions exist in WGSL
//! (`shaders/common.wgsl`); the Rust versions back the tests and benchmarks.
//!
//! ### Configuration
//!
//! Every tunable lives in [`SceneConfig`], which loads from JSON. Missing
//! fields take their defaults:
//!
//! ```ignore
//! let config = SceneConfig::load("heart.json")?;
//! Scene::new().with_config(config).run()?;
//! ```
//!
//! ### Title text
//!
//! The title is read from a typeface JSON file on a worker thread
//! ([`font::FontTask`]). Until it arrives, or if it never does, the heart
//! renders alone.
//!
//! ## Logging
//!
//! The crate logs through the `log` facade. The bundled binary installs
//! `env_logger`; set `RUST_LOG=debug` for per-resize and FPS output.

pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod gpu;
pub mod heart;
pub mod input;
mod scene;
pub mod shader;
pub mod spawn;
pub mod time;

pub use bytemuck;
pub use color::Color;
pub use config::SceneConfig;
pub use error::{ConfigError, FontError, GpuError, SceneError, ShaderError};
pub use glam::{Mat4, Vec2, Vec3, Vec4};
pub use scene::{Scene, SceneEvent};
pub use spawn::{ParticleCloud, ParticleField, ParticleVertex, MAX_PARTICLES};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use heartfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::config::SceneConfig;
    pub use crate::error::SceneError;
    pub use crate::font::{TextMesh, TextStyle, Typeface};
    pub use crate::scene::Scene;
    pub use crate::spawn::ParticleField;
    pub use crate::time::Clock;
    pub use crate::{Vec2, Vec3, Vec4};
}
