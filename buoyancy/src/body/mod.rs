//! Buoyant bodies: voxelization, per-step force integration and the rules for
//! which colliders float.

pub mod collider;
pub mod factory;
pub mod floating;
pub mod integrator;
pub mod settings;
pub mod voxelizer;

pub use collider::{ensure_collider, ColliderShape, RigidBodyHandle};
pub use factory::{BuoyancyFactory, OverlapCandidate};
pub use floating::FloatingBody;
pub use integrator::BuoyancyStepReport;
pub use settings::BuoyancySettings;
pub use voxelizer::{voxelize, voxels_per_axis, VoxelGrid};
