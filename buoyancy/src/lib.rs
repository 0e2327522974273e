//! Buoyancy physics for floating rigid bodies on an animated water surface.
//!
//! The crate is split the same way the data flows each physics step:
//! - [`water`]: the tessellated water grid, its wave displacement and the
//!   surface queries (`water_level`, `surface_normal`, `is_submerged`).
//! - [`body`]: voxelization of a collider into sample points and the
//!   per-step buoyancy integration for a [`FloatingBody`].
//! - [`plugin`]: Bevy + Rapier glue that drives the lifecycle hooks from
//!   fixed-step, frame and overlap events.

pub mod body;
pub mod constants;
pub mod error;
pub mod plugin;
pub mod water;

pub use body::{
    BuoyancyFactory, BuoyancySettings, BuoyancyStepReport, ColliderShape, FloatingBody,
    OverlapCandidate, RigidBodyHandle,
};
pub use constants::*;
pub use error::BuoyancyError;
pub use plugin::{
    water_volume_bundle, water_volume_collider, BuoyancyConfig, BuoyancyOverride, BuoyancyPlugin,
    BuoyantRigidBody, WaterVolume,
};
pub use water::{
    NoiseLayer, SurfacePatch, WaterGrid, WaterSample, WaterSurface, WaterSurfaceConfig,
    WaveConfig, WaveDisplacement, WavePreset,
};
