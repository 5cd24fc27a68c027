//! The heartbeat: pulsation radius and implicit heart surface.
//!
//! These are CPU mirrors of the functions in `shaders/common.wgsl`. The GPU
//! runs them per vertex every frame; the CPU versions exist so the math can be
//! tested and benchmarked without a device, and must stay in lockstep with
//! the WGSL.
//!
//! The surface is the `BASE_RADIUS` level set of a warped distance field. A
//! point `p` is mapped to field space `h`, and `|h| - r(t)` says how far it
//! sits from the (pulsing) surface. Moving `p` along `-normalize(p)` by that
//! amount pulls the whole random cloud onto a heart that beats.

use glam::Vec3;
use std::f32::consts::PI;

/// Half-period of the folded pulse phase.
pub const PULSE_LIMIT: f32 = 0.675;
/// Phase window in which the pulse fires; outside it the radius rests.
pub const PULSE_WINDOW: f32 = 0.5;
/// Time multiplier applied before folding.
pub const PULSE_RATE: f32 = 1.25;
/// Resting radius of the heart surface in field units.
pub const BASE_RADIUS: f32 = 15.0;
/// Peak radius increase during a beat.
pub const PULSE_AMPLITUDE: f32 = 1.2;
/// World units per field unit.
pub const FIELD_SCALE: f32 = 2.5;
/// Depth of the visible shell below the resting surface, in field units.
pub const SHELL_THICKNESS: f32 = 1.0;

/// Seconds between two beats.
pub const PULSE_PERIOD: f32 = 2.0 * PULSE_LIMIT / PULSE_RATE;

/// Folded pulse phase in `[-PULSE_LIMIT, PULSE_LIMIT)`.
#[inline]
pub fn pulse_phase(time: f32) -> f32 {
    let scaled = time * PULSE_RATE;
    scaled - PULSE_LIMIT * (2.0 * (scaled / (PULSE_LIMIT * 2.0)).floor() + 1.0)
}

/// Pulsation radius `r(t)`.
///
/// Rests at [`BASE_RADIUS`] and spikes by up to [`PULSE_AMPLITUDE`] once per
/// [`PULSE_PERIOD`].
pub fn pulse_radius(time: f32) -> f32 {
    let dt = pulse_phase(time);
    if !(-PULSE_WINDOW..=PULSE_WINDOW).contains(&dt) {
        return BASE_RADIUS;
    }
    let s = (2.0 * PI * dt).sin();
    let s2 = s * s;
    BASE_RADIUS + PULSE_AMPLITUDE * s2 * s2
}

/// Uniform scale applied to the title text so it breathes with the particles.
#[inline]
pub fn breath_scale(time: f32) -> f32 {
    pulse_radius(time) / BASE_RADIUS
}

/// Map a world-space point into heart-field space.
pub fn field_coordinates(p: Vec3) -> Vec3 {
    let mut h = p / FIELD_SCALE;
    let ax = h.x.abs();
    h.y = 4.0 + 1.2 * h.y - ax * ((20.0 - ax) / 15.0).max(0.0).sqrt();
    h.z *= 2.0 - h.y / 15.0;
    h
}

/// Result of pulling one point toward the heart surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartSample {
    /// Displaced position in world space.
    pub position: Vec3,
    /// Signed field distance to the pulsing surface (`|h| - r`).
    pub dynamic_distance: f32,
    /// Signed field distance to the resting surface (`|h| - 15`).
    pub rest_distance: f32,
    /// Whether the point lies outside the visible shell and is dropped.
    pub culled: bool,
}

/// Pull `p` toward the heart surface of radius `radius`.
///
/// A point at the origin has no direction to move along and is left in place.
pub fn displace(p: Vec3, radius: f32) -> HeartSample {
    let h = field_coordinates(p);
    let len = h.length();
    let dynamic_distance = len - radius;
    let rest_distance = len - BASE_RADIUS;

    HeartSample {
        position: p - p.normalize_or_zero() * dynamic_distance * FIELD_SCALE,
        dynamic_distance,
        rest_distance,
        culled: is_culled(rest_distance),
    }
}

/// Shell test. Both boundaries are kept: only strictly outside is dropped.
#[inline]
pub fn is_culled(rest_distance: f32) -> bool {
    rest_distance > 0.0 || rest_distance < -SHELL_THICKNESS
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_rest_at_time_zero() {
        assert_eq!(pulse_phase(0.0), -PULSE_LIMIT);
        assert_eq!(pulse_radius(0.0), BASE_RADIUS);
    }

    #[test]
    fn test_pulse_bounds() {
        for i in 0..10_000 {
            let t = i as f32 * 0.0037;
            let r = pulse_radius(t);
            assert!(r >= BASE_RADIUS, "r({t}) = {r}");
            assert!(r <= BASE_RADIUS + PULSE_AMPLITUDE + EPS, "r({t}) = {r}");
        }
    }

    #[test]
    fn test_pulse_is_periodic() {
        for i in 0..500 {
            let t = i as f32 * 0.013;
            let a = pulse_radius(t);
            let b = pulse_radius(t + PULSE_PERIOD);
            assert!((a - b).abs() < 1e-3, "t={t}: {a} vs {b}");
        }
    }

    #[test]
    fn test_pulse_peaks_inside_window() {
        // sin(2π·0.25) = 1, so dt = 0.25 is a peak.
        let t = (0.25 + PULSE_LIMIT) / PULSE_RATE;
        assert!((pulse_phase(t) - 0.25).abs() < EPS);
        assert!((pulse_radius(t) - (BASE_RADIUS + PULSE_AMPLITUDE)).abs() < EPS);
    }

    #[test]
    fn test_negative_sine_is_well_defined() {
        let t = (-0.25 + PULSE_LIMIT) / PULSE_RATE;
        let r = pulse_radius(t);
        assert!(r.is_finite());
        assert!((r - (BASE_RADIUS + PULSE_AMPLITUDE)).abs() < EPS);
    }

    #[test]
    fn test_breath_scale() {
        assert_eq!(breath_scale(0.0), 1.0);
    }

    #[test]
    fn test_shell_boundaries_are_kept() {
        assert!(!is_culled(0.0));
        assert!(!is_culled(-SHELL_THICKNESS));
        assert!(!is_culled(-0.5));
        assert!(is_culled(0.001));
        assert!(is_culled(-1.001));
    }

    #[test]
    fn test_origin_stays_put() {
        let s = displace(Vec3::ZERO, BASE_RADIUS);
        assert_eq!(s.position, Vec3::ZERO);
    }
}
