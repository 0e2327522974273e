use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ANGULAR_DRAG_IN_WATER, DEFAULT_BUOYANCY, DEFAULT_DRAG_IN_WATER,
    DEFAULT_VOXEL_FRACTION, MAX_BUOYANCY, MIN_BUOYANCY,
};
use crate::error::BuoyancyError;

/// Per-body buoyancy tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuoyancySettings {
    /// Fraction of the body's weight the water pushes back with when fully submerged
    pub buoyancy: f32,
    /// Voxel edge as a fraction of the collider bounds, in (0, 1]
    pub voxel_fraction: f32,
    /// Linear damping reached when fully submerged
    pub drag_in_water: f32,
    /// Angular damping reached when fully submerged
    pub angular_drag_in_water: f32,
}

impl Default for BuoyancySettings {
    fn default() -> Self {
        Self {
            buoyancy: DEFAULT_BUOYANCY,
            voxel_fraction: DEFAULT_VOXEL_FRACTION,
            drag_in_water: DEFAULT_DRAG_IN_WATER,
            angular_drag_in_water: DEFAULT_ANGULAR_DRAG_IN_WATER,
        }
    }
}

impl BuoyancySettings {
    pub fn validate(&self) -> Result<(), BuoyancyError> {
        if self.voxel_fraction.is_nan() || self.voxel_fraction <= 0.0 || self.voxel_fraction > 1.0
        {
            return Err(BuoyancyError::VoxelFraction(self.voxel_fraction));
        }
        if !(MIN_BUOYANCY..=MAX_BUOYANCY).contains(&self.buoyancy) {
            return Err(BuoyancyError::BuoyancyCoefficient {
                value: self.buoyancy,
                min: MIN_BUOYANCY,
                max: MAX_BUOYANCY,
            });
        }
        if self.drag_in_water.is_nan()
            || self.drag_in_water < 0.0
            || self.angular_drag_in_water.is_nan()
            || self.angular_drag_in_water < 0.0
        {
            return Err(BuoyancyError::NegativeDrag {
                drag: self.drag_in_water,
                angular: self.angular_drag_in_water,
            });
        }
        Ok(())
    }

    /// Same settings with the buoyancy shared between `parts` colliders.
    pub fn split_between(mut self, parts: usize) -> Self {
        if parts > 1 {
            self.buoyancy /= parts as f32;
        }
        self
    }
}
