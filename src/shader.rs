//! WGSL programs and their CPU-side uniform layouts.
//!
//! Shader text lives in `src/shaders/` and is embedded at build time. Every
//! program is parsed and validated with naga before wgpu sees it, so a broken
//! shader is reported with its name and source span instead of surfacing as a
//! device error later.

use bytemuck::{Pod, Zeroable};
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::error::ShaderError;

/// Particle sprites: heart displacement, gradient, round discard.
pub const PARTICLE_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/particles.wgsl")
);

/// Extruded title text: breathing scale and gradient.
pub const TEXT_SOURCE: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/text.wgsl")
);

/// Bloom luminosity high-pass.
pub const HIGH_PASS_SOURCE: &str = concat!(
    include_str!("shaders/fullscreen.wgsl"),
    include_str!("shaders/bloom_high_pass.wgsl")
);

/// Separable Gaussian blur, one direction per pass.
pub const BLUR_SOURCE: &str = concat!(
    include_str!("shaders/fullscreen.wgsl"),
    include_str!("shaders/bloom_blur.wgsl")
);

/// Bloom mip composite and tone mapping onto the surface.
pub const COMPOSITE_SOURCE: &str = concat!(
    include_str!("shaders/fullscreen.wgsl"),
    include_str!("shaders/bloom_composite.wgsl")
);

/// Every program the renderer builds, with its label.
pub const ALL_SOURCES: [(&str, &str); 5] = [
    ("Particle", PARTICLE_SOURCE),
    ("Text", TEXT_SOURCE),
    ("Bloom High-Pass", HIGH_PASS_SOURCE),
    ("Bloom Blur", BLUR_SOURCE),
    ("Bloom Composite", COMPOSITE_SOURCE),
];

/// Per-frame uniforms shared by the particle and text programs.
///
/// Mirrors `Uniforms` in `common.wgsl`; colours are linear RGB padded to vec4.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub particle_color_a: [f32; 4],
    pub particle_color_b: [f32; 4],
    pub text_color_a: [f32; 4],
    pub text_color_b: [f32; 4],
    pub viewport: [f32; 2],
    pub time: f32,
    pub point_size: f32,
    pub pixel_ratio: f32,
    pub _padding: [f32; 3],
}

/// Parse and validate a WGSL program.
pub fn validate(label: &'static str, source: &str) -> Result<(), ShaderError> {
    let module = wgsl::parse_str(source).map_err(|err| ShaderError {
        label,
        message: err.emit_to_string(source),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator.validate(&module).map_err(|err| ShaderError {
        label,
        message: err.emit_to_string(source),
    })?;

    Ok(())
}

/// Validate, then hand the program to wgpu.
pub fn compile(
    device: &wgpu::Device,
    label: &'static str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    validate(label, source)?;
    log::debug!("compiling {label} shader ({} bytes)", source.len());

    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout_matches_wgsl() {
        // 3 mat4 + 4 vec4 + vec2 + 3 f32, rounded up to 16.
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 288);
    }

    #[test]
    fn test_bad_shader_reports_label() {
        let err = validate("Broken", "fn main( {").unwrap_err();
        assert_eq!(err.label, "Broken");
        assert!(!err.message.is_empty());
        assert!(err.to_string().starts_with("Broken shader error"));
    }
}
