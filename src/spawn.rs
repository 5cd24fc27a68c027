//! Particle field generation.
//!
//! The heart is carved out of a plain random cube: points are scattered
//! uniformly in `[0, extent)^3`, the cloud is shifted so its centroid sits at
//! the origin, and the vertex shader does the rest.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Largest cloud the particle vertex buffer can hold under wgpu's default
/// 256 MiB `max_buffer_size` at 16 bytes per particle.
pub const MAX_PARTICLES: u32 = 1 << 24;

/// Shape and density of the random point cloud.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleField {
    pub x_size: u32,
    pub y_size: u32,
    pub z_size: u32,
    /// Points per grid cell.
    pub density: u32,
    /// Edge length of the spawn cube in world units.
    pub extent: f32,
    /// Range of the per-point speed attribute.
    pub speed_range: Range<f32>,
    /// Fixed RNG seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for ParticleField {
    fn default() -> Self {
        Self {
            x_size: 50,
            y_size: 50,
            z_size: 50,
            density: 2,
            extent: 100.0,
            speed_range: 2.0..12.0,
            seed: None,
        }
    }
}

impl ParticleField {
    /// Number of points this field produces, or `None` if the product
    /// overflows `u32`.
    pub fn particle_count(&self) -> Option<u32> {
        self.x_size
            .checked_mul(self.y_size)?
            .checked_mul(self.z_size)?
            .checked_mul(self.density)
    }

    /// Scatter the cloud and centre it on its centroid.
    ///
    /// The count is capped at [`MAX_PARTICLES`]; run
    /// [`SceneConfig::validate`](crate::SceneConfig::validate) first to
    /// reject oversized fields instead.
    pub fn generate(&self) -> ParticleCloud {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let count = self.particle_count().map_or(MAX_PARTICLES, |n| n.min(MAX_PARTICLES)) as usize;
        let mut positions = Vec::with_capacity(count);
        let mut speeds = Vec::with_capacity(count);

        for _ in 0..count {
            let unit = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            positions.push(unit * self.extent);
            speeds.push(rng.gen_range(self.speed_range.clone()));
        }

        let mut cloud = ParticleCloud { positions, speeds };
        cloud.center();
        cloud
    }
}

/// The generated particle set. Its size never changes after generation.
#[derive(Clone, Debug, Default)]
pub struct ParticleCloud {
    pub positions: Vec<Vec3>,
    /// Per-point scalar carried to the GPU but read by no shader.
    pub speeds: Vec<f32>,
}

impl ParticleCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Mean position. Accumulated in f64: a quarter million f32 sums drift.
    pub fn centroid(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        let sum = self
            .positions
            .iter()
            .fold(glam::DVec3::ZERO, |acc, p| acc + p.as_dvec3());
        (sum / self.positions.len() as f64).as_vec3()
    }

    /// Translate every point so the centroid is the origin.
    pub fn center(&mut self) {
        let c = self.centroid();
        for p in &mut self.positions {
            *p -= c;
        }
    }

    /// Interleave into the vertex layout the particle pipeline expects.
    pub fn to_vertices(&self) -> Vec<ParticleVertex> {
        self.positions
            .iter()
            .zip(&self.speeds)
            .map(|(p, &speed)| ParticleVertex {
                position: p.to_array(),
                speed,
            })
            .collect()
    }
}

/// One particle as uploaded to the vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub speed: f32,
}
