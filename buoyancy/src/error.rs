use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BuoyancyError {
    #[error("voxel fraction must be in (0, 1], got {0}")]
    VoxelFraction(f32),
    #[error("buoyancy coefficient must be in [{min}, {max}], got {value}")]
    BuoyancyCoefficient { value: f32, min: f32, max: f32 },
    #[error("drag coefficients must be non-negative, got drag={drag} angular={angular}")]
    NegativeDrag { drag: f32, angular: f32 },
    #[error("water grid needs at least one row and one column, got {rows}x{columns}")]
    EmptyGrid { rows: u32, columns: u32 },
    #[error("water cell size must be positive, got {0}")]
    CellSize(f32),
}
