//! Colours and the positional two-colour gradient.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Frequency of the diagonal gradient wave, per world unit.
pub const GRADIENT_FREQUENCY: f32 = 0.01;
/// Upper edge of the gradient smoothstep. Above 1.0 so the second colour is
/// never fully reached.
pub const GRADIENT_EDGE: f32 = 1.2;

/// An sRGB colour stored as `0xRRGGBB`.
///
/// Serialises as a `"#rrggbb"` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const fn from_hex(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    /// sRGB components in `[0, 1]`.
    pub fn to_srgb(self) -> Vec3 {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        Vec3::new(r, g, b)
    }

    /// Linear-light components, the space the shaders blend and bloom in.
    pub fn to_linear(self) -> Vec3 {
        let c = self.to_srgb();
        Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
    }

    /// Linear components padded to a uniform-friendly `vec4`.
    pub fn to_linear_array(self) -> [f32; 4] {
        self.to_linear().extend(1.0).to_array()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let digits = s.strip_prefix('#').unwrap_or(&s);
        if digits.len() != 6 {
            return Err(format!("expected #rrggbb, got {s:?}"));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|e| format!("bad colour {s:?}: {e}"))
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        format!("#{:06x}", c.0)
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Hermite smoothstep, matching WGSL `smoothstep`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blend weight of the second colour at an (undisplaced) position.
pub fn gradient_factor(p: Vec3) -> f32 {
    let wave = (p.x * GRADIENT_FREQUENCY + p.y * GRADIENT_FREQUENCY).sin();
    smoothstep(0.0, GRADIENT_EDGE, (wave + 1.0) / 2.0)
}

/// Gradient colour at `p`, mixing `a` toward `b`.
pub fn gradient(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    a.lerp(b, gradient_factor(p))
}
