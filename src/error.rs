//! Error types for heartfield.
//!
//! Every fallible operation in the crate returns one of these. GPU and shader
//! failures abort startup; font failures are recoverable and only cost the
//! scene its title text.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found ({0}); a GPU with Vulkan/Metal/DX12 support is required")]
    NoAdapter(#[from] wgpu::RequestAdapterError),
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("surface supports no texture formats on this adapter")]
    NoSurfaceFormat,
}

/// A WGSL program that failed to parse or validate.
#[derive(Debug, Clone, Error)]
#[error("{label} shader error: {message}")]
pub struct ShaderError {
    /// Which program failed (e.g. "Particle", "Bloom").
    pub label: &'static str,
    /// Diagnostic rendered by naga, including the source span.
    pub message: String,
}

/// Errors from loading a typeface and building the text mesh.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("failed to read font file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid typeface JSON.
    #[error("malformed typeface JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The typeface metrics cannot scale glyphs to finite positions.
    #[error("unusable typeface metrics: {0}")]
    Metrics(String),
    /// A glyph outline string could not be interpreted.
    #[error("bad outline for glyph {glyph:?}: {message}")]
    Outline { glyph: char, message: String },
    /// lyon rejected a glyph's contours.
    #[error("failed to tessellate glyph {glyph:?}: {message}")]
    Tessellation { glyph: char, message: String },
    /// The task was cancelled before it finished.
    #[error("font load cancelled")]
    Cancelled,
    /// The worker thread went away without reporting a result.
    #[error("font worker exited without a result")]
    Disconnected,
}

impl FontError {
    /// Whether trying the same load again could plausibly succeed.
    ///
    /// Only I/O failures qualify. A worker that died without reporting hit a
    /// panic on the same input it would be given again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FontError::Io { .. })
    }
}

/// Errors from loading or validating a [`SceneConfig`](crate::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur when running the scene.
#[derive(Debug, Error)]
pub enum SceneError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// A shader failed validation.
    #[error(transparent)]
    Shader(#[from] ShaderError),
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
