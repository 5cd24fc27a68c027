//! Integration tests for the heart field, gradient and particle cloud.
//!
//! These exercise the CPU mirrors of the shader math through the public API.

use glam::Vec3;
use heartfield::color::{gradient, gradient_factor, Color};
use heartfield::heart::{
    displace, is_culled, pulse_radius, BASE_RADIUS, PULSE_AMPLITUDE, PULSE_PERIOD,
};
use heartfield::ParticleField;

// ============================================================================
// Pulsation radius
// ============================================================================

#[test]
fn test_radius_at_start_is_resting() {
    assert_eq!(pulse_radius(0.0), BASE_RADIUS);
}

#[test]
fn test_radius_stays_in_band() {
    for i in 0..20_000 {
        let t = i as f32 * 0.0007;
        let r = pulse_radius(t);
        assert!(r >= BASE_RADIUS, "t = {t}: r = {r}");
        assert!(r <= BASE_RADIUS + PULSE_AMPLITUDE, "t = {t}: r = {r}");
    }
}

#[test]
fn test_radius_is_periodic() {
    assert!((PULSE_PERIOD - 1.08).abs() < 1e-6);
    for i in 0..200 {
        let t = i as f32 * 0.013;
        let a = pulse_radius(t);
        let b = pulse_radius(t + 3.0 * PULSE_PERIOD);
        assert!((a - b).abs() < 1e-3, "t = {t}: {a} vs {b}");
    }
}

#[test]
fn test_radius_beats_once_per_period() {
    // Sample one period finely; the radius must leave the rest value and
    // return to it.
    let samples: Vec<f32> = (0..1080).map(|i| pulse_radius(i as f32 * 0.001)).collect();
    let peak = samples.iter().cloned().fold(f32::MIN, f32::max);
    assert!(peak > BASE_RADIUS + 1.0);
    assert!(samples.iter().any(|&r| r == BASE_RADIUS));
}

// ============================================================================
// Displacement and shell
// ============================================================================

#[test]
fn test_displacement_moves_along_negative_direction() {
    let points = [
        Vec3::new(10.0, 20.0, 5.0),
        Vec3::new(-30.0, 8.0, -12.0),
        Vec3::new(45.0, -40.0, 30.0),
        Vec3::new(0.5, 49.0, -49.0),
    ];

    for p in points {
        for r in [15.0, 15.6, 16.2] {
            let sample = displace(p, r);
            if sample.dynamic_distance <= 0.0 {
                continue;
            }
            let moved = sample.position - p;
            let dir = p.normalize();
            // Parallel to -dir, with length dDyn * 2.5.
            assert!(moved.cross(dir).length() < 1e-3, "p = {p}");
            assert!(moved.dot(dir) < 0.0, "p = {p}");
            assert!((moved.length() - sample.dynamic_distance * 2.5).abs() < 1e-3);
        }
    }
}

#[test]
fn test_dynamic_distance_decreases_with_radius() {
    let p = Vec3::new(30.0, 25.0, 20.0);
    let mut last = f32::MAX;
    for step in 0..=12 {
        let r = BASE_RADIUS + PULSE_AMPLITUDE * step as f32 / 12.0;
        let d = displace(p, r).dynamic_distance;
        assert!(d < last);
        last = d;
    }
}

#[test]
fn test_shell_boundaries_are_kept() {
    assert!(!is_culled(0.0));
    assert!(!is_culled(-1.0));
    assert!(!is_culled(-0.5));
    assert!(is_culled(1e-4));
    assert!(is_culled(-1.0001));
}

#[test]
fn test_far_points_are_culled() {
    let sample = displace(Vec3::new(200.0, 200.0, 200.0), BASE_RADIUS);
    assert!(sample.rest_distance > 0.0);
    assert!(sample.culled);
}

// ============================================================================
// Gradient
// ============================================================================

#[test]
fn test_gradient_factor_at_origin() {
    // sin(0) = 0 -> 0.5 -> smoothstep(0, 1.2, 0.5)
    let t: f32 = 0.5 / 1.2;
    let expected = t * t * (3.0 - 2.0 * t);
    assert!((expected - 0.376157).abs() < 1e-5);

    for z in [-50.0, 0.0, 50.0] {
        let f = gradient_factor(Vec3::new(0.0, 0.0, z));
        assert!((f - expected).abs() < 1e-6);
    }
}

#[test]
fn test_gradient_mixes_colors() {
    let a = Color::from_hex(0xfc466b).to_linear();
    let b = Color::from_hex(0x3f5efb).to_linear();
    let f = gradient_factor(Vec3::ZERO);
    let mixed = gradient(Vec3::ZERO, a, b);
    let expected = a * (1.0 - f) + b * f;
    assert!((mixed - expected).length() < 1e-6);
}

#[test]
fn test_gradient_ignores_z() {
    let p = Vec3::new(12.0, -7.0, 0.0);
    assert_eq!(
        gradient_factor(p),
        gradient_factor(p + Vec3::new(0.0, 0.0, 33.0))
    );
}

// ============================================================================
// Particle cloud
// ============================================================================

#[test]
fn test_cloud_centroid_is_origin_for_any_seed() {
    for seed in [0, 1, 7, 123, 99_999] {
        let field = ParticleField {
            x_size: 20,
            y_size: 20,
            z_size: 20,
            density: 1,
            seed: Some(seed),
            ..Default::default()
        };
        let cloud = field.generate();
        assert_eq!(cloud.len(), 8000);
        assert!(cloud.centroid().length() < 1e-3, "seed {seed}");
    }
}

#[test]
fn test_some_particles_land_in_shell() {
    let field = ParticleField {
        x_size: 20,
        y_size: 20,
        z_size: 20,
        density: 2,
        seed: Some(5),
        ..Default::default()
    };
    let cloud = field.generate();
    let visible = cloud
        .positions
        .iter()
        .filter(|&&p| !displace(p, BASE_RADIUS).culled)
        .count();
    assert!(visible > 0);
    assert!(visible < cloud.len());
}
