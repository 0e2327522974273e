//! Serializable configuration for water surfaces.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CELL_SIZE, DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WAVE_AMPLITUDE, DEFAULT_WAVE_SPEED,
};
use crate::error::BuoyancyError;

/// Optional Perlin term layered on top of the sine wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseLayer {
    pub seed: u32,
    /// Scale applied to the base vertex (x, z) before sampling.
    pub frequency: f32,
    /// Height contributed by a noise value of 1.0.
    pub amplitude: f32,
}

impl Default for NoiseLayer {
    fn default() -> Self {
        Self {
            seed: 0,
            frequency: 1.0,
            amplitude: 0.1,
        }
    }
}

/// Parameters of the wave displacement function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Phase advance per second
    pub speed: f32,
    /// Peak vertical offset of the sine term
    pub amplitude: f32,
    #[serde(default)]
    pub noise: Option<NoiseLayer>,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_WAVE_SPEED,
            amplitude: DEFAULT_WAVE_AMPLITUDE,
            noise: None,
        }
    }
}

impl WaveConfig {
    /// Highest point a displaced vertex can reach above its base position.
    pub fn max_height(&self) -> f32 {
        self.amplitude.abs() + self.noise.map_or(0.0, |n| n.amplitude.abs())
    }
}

/// Complete description of one water volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterSurfaceConfig {
    pub rows: u32,
    pub columns: u32,
    /// Edge length of one grid quad in local units
    pub cell_size: f32,
    #[serde(default)]
    pub waves: WaveConfig,
}

impl Default for WaterSurfaceConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
            cell_size: DEFAULT_CELL_SIZE,
            waves: WaveConfig::default(),
        }
    }
}

impl WaterSurfaceConfig {
    pub fn validate(&self) -> Result<(), BuoyancyError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(BuoyancyError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(BuoyancyError::CellSize(self.cell_size));
        }
        Ok(())
    }
}

/// Preset wave settings for different kinds of water.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum WavePreset {
    /// Completely flat water
    Still,
    /// Barely moving pond
    Calm,
    /// Default volume settings
    #[default]
    Lake,
    /// Large rolling waves with a noise layer
    Storm,
}

impl WavePreset {
    pub fn to_config(self) -> WaveConfig {
        match self {
            WavePreset::Still => WaveConfig {
                speed: 0.0,
                amplitude: 0.0,
                noise: None,
            },
            WavePreset::Calm => WaveConfig {
                speed: 0.5,
                amplitude: 0.05,
                noise: None,
            },
            WavePreset::Lake => WaveConfig::default(),
            WavePreset::Storm => WaveConfig {
                speed: 2.0,
                amplitude: 0.8,
                noise: Some(NoiseLayer {
                    seed: 7,
                    frequency: 0.35,
                    amplitude: 0.25,
                }),
            },
        }
    }
}
