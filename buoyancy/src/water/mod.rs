//! Animated water surface shared by every floating body.
//!
//! [`WaterSurfaceConfig`] describes a [`WaterGrid`] of base vertices and the
//! waves that move them. [`WaterSurface`] combines both to answer level,
//! normal and submersion queries. Displaced vertices are evaluated on demand
//! for the three corners of the queried triangle, never cached per frame.

pub mod config;
pub mod grid;
pub mod surface;
pub mod waves;

pub use config::{NoiseLayer, WaterSurfaceConfig, WaveConfig, WavePreset};
pub use grid::{TriggerVolume, WaterGrid};
pub use surface::{SurfacePatch, WaterSample, WaterSurface};
pub use waves::WaveDisplacement;
