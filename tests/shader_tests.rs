//! Every WGSL program the renderer builds must pass naga validation, and the
//! CPU-side layouts must match what the shaders expect.

use heartfield::shader::{self, FrameUniforms, ALL_SOURCES};
use heartfield::ParticleVertex;

#[test]
fn test_all_shaders_validate() {
    for (label, source) in ALL_SOURCES {
        if let Err(err) = shader::validate(label, source) {
            panic!("{err}");
        }
    }
}

#[test]
fn test_programs_expose_entry_points() {
    for (label, source) in ALL_SOURCES {
        assert!(source.contains("fn vs_main"), "{label} has no vertex entry");
        assert!(source.contains("fn fs_main"), "{label} has no fragment entry");
    }
}

#[test]
fn test_uniform_and_vertex_sizes() {
    assert_eq!(std::mem::size_of::<FrameUniforms>(), 288);
    assert_eq!(std::mem::size_of::<ParticleVertex>(), 16);
}

#[test]
fn test_shared_constants_match_cpu() {
    use heartfield::heart::{BASE_RADIUS, FIELD_SCALE, PULSE_LIMIT, PULSE_RATE};

    let common = shader::PARTICLE_SOURCE;
    assert!(common.contains(&format!("const PULSE_LIMIT: f32 = {PULSE_LIMIT};")));
    assert!(common.contains(&format!("const PULSE_RATE: f32 = {PULSE_RATE};")));
    assert!(common.contains(&format!("const BASE_RADIUS: f32 = {BASE_RADIUS:.1};")));
    assert!(common.contains(&format!("const FIELD_SCALE: f32 = {FIELD_SCALE};")));
}

#[test]
fn test_high_pass_uses_rec709_luma() {
    assert!(shader::HIGH_PASS_SOURCE.contains("vec3<f32>(0.2126, 0.7152, 0.0722)"));
    assert!(!shader::HIGH_PASS_SOURCE.contains("0.587"));
}

#[test]
fn test_invalid_program_is_rejected() {
    let source = "@fragment fn fs_main() -> @location(0) vec4<f32> { return undefined_fn(); }";
    let err = shader::validate("Scratch", source).unwrap_err();
    assert_eq!(err.label, "Scratch");
}
