pub const GRAVITY: f32 = 9.81;
pub const DEFAULT_ROWS: u32 = 10;
pub const DEFAULT_COLUMNS: u32 = 10;
pub const DEFAULT_CELL_SIZE: f32 = 1.0;
pub const DEFAULT_WAVE_SPEED: f32 = 1.0;
pub const DEFAULT_WAVE_AMPLITUDE: f32 = 0.3;
/// Depth of the overlap box hanging below the water surface.
pub const WATER_TRIGGER_DEPTH: f32 = 5.0;
pub const DEFAULT_BUOYANCY: f32 = 0.95;
pub const DEFAULT_VOXEL_FRACTION: f32 = 0.5;
pub const DEFAULT_DRAG_IN_WATER: f32 = 1.0;
pub const DEFAULT_ANGULAR_DRAG_IN_WATER: f32 = 1.0;
pub const MIN_BUOYANCY: f32 = 0.1;
pub const MAX_BUOYANCY: f32 = 2.0;
/// Below this vertical normal component a patch is treated as a vertical wall.
pub const DEGENERATE_NORMAL_EPSILON: f32 = 1e-6;
pub const MISSING_COLLIDER_WARNING: &str = "had no collider, a unit box collider has been added";
