//! Closed-form vertical wave displacement.

use bevy::math::Vec3;
use noise::{NoiseFn, Perlin};

use super::config::{NoiseLayer, WaveConfig};

/// Vertical offset applied to every base vertex of the water grid.
///
/// `offset(v, t) = sin(t * speed + v.x + v.y + v.z) * amplitude`, plus an
/// optional Perlin term sampled at the vertex (x, z). Holds no time state:
/// the same vertex and time always give the same offset.
#[derive(Debug, Clone)]
pub struct WaveDisplacement {
    speed: f32,
    amplitude: f32,
    noise: Option<(NoiseLayer, Perlin)>,
}

impl WaveDisplacement {
    pub fn new(config: &WaveConfig) -> Self {
        Self {
            speed: config.speed,
            amplitude: config.amplitude,
            noise: config.noise.map(|layer| (layer, Perlin::new(layer.seed))),
        }
    }

    /// Water that never moves.
    pub fn flat() -> Self {
        Self {
            speed: 0.0,
            amplitude: 0.0,
            noise: None,
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Largest possible |offset|.
    pub fn max_height(&self) -> f32 {
        self.amplitude.abs() + self.noise.as_ref().map_or(0.0, |(layer, _)| layer.amplitude.abs())
    }

    #[inline]
    pub fn offset(&self, base: Vec3, time: f32) -> f32 {
        let mut offset = (time * self.speed + base.x + base.y + base.z).sin() * self.amplitude;

        if let Some((layer, perlin)) = &self.noise {
            let sample = perlin.get([
                (base.x * layer.frequency) as f64,
                (base.z * layer.frequency) as f64,
            ]);
            offset += sample as f32 * layer.amplitude;
        }

        offset
    }

    /// Base vertex moved by [`WaveDisplacement::offset`] along local Y.
    #[inline]
    pub fn displace(&self, base: Vec3, time: f32) -> Vec3 {
        base + Vec3::Y * self.offset(base, time)
    }
}

impl Default for WaveDisplacement {
    fn default() -> Self {
        Self::new(&WaveConfig::default())
    }
}
