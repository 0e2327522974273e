//! Per-step force accumulation over a body's voxels.

use bevy::math::{Quat, Vec3};
use bevy::transform::components::Transform;

use super::collider::RigidBodyHandle;
use crate::water::WaterSurface;

/// Outcome of one fixed step for one floating collider.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuoyancyStepReport {
    /// Sum of the forces applied this step, world space
    pub total_force: Vec3,
    /// Mean submerged factor over all voxels, in [0, 1]
    pub submerged_fraction: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub voxel_count: usize,
}

/// Upward force the whole body receives when fully submerged.
#[inline]
pub fn buoyancy_force(gravity: f32, mass: f32, coefficient: f32) -> Vec3 {
    Vec3::Y * gravity * mass * coefficient
}

/// How much of a voxel of height `voxel_height` centred at `y` is under `level`.
pub fn submerged_factor(level: f32, y: f32, voxel_height: f32) -> f32 {
    let depth = level - y + voxel_height * 0.5;
    if voxel_height <= 0.0 {
        return if depth > 0.0 { 1.0 } else { 0.0 };
    }
    (depth / voxel_height).clamp(0.0, 1.0)
}

/// Force on one voxel: `share` scaled by `factor`, tilted from the water's up
/// axis toward the local surface normal. The tilt fades out as the voxel sinks.
pub fn voxel_force(share: Vec3, factor: f32, water_up: Vec3, normal: Vec3) -> Vec3 {
    let tilt = if normal.length_squared() > f32::EPSILON {
        Quat::from_rotation_arc(water_up, normal)
    } else {
        Quat::IDENTITY
    };
    let rotation = tilt.slerp(Quat::IDENTITY, factor);
    rotation * (share * factor)
}

/// Applies the buoyant force of every voxel to `body` and returns the summed
/// force and the mean submerged factor. Damping is left to the caller.
pub fn integrate(
    voxels: &[Vec3],
    transform: &Transform,
    voxel_height: f32,
    surface: &WaterSurface,
    total: Vec3,
    body: &mut impl RigidBodyHandle,
) -> (Vec3, f32) {
    if voxels.is_empty() {
        return (Vec3::ZERO, 0.0);
    }
    let share = total / voxels.len() as f32;
    let water_up = surface.up();

    let mut applied = Vec3::ZERO;
    let mut submerged = 0.0;
    for voxel in voxels {
        let point = transform.transform_point(*voxel);
        let sample = surface.sample(point);
        let factor = submerged_factor(sample.level, point.y, voxel_height);
        submerged += factor;

        let force = voxel_force(share, factor, water_up, sample.normal);
        body.apply_force_at_point(force, point);
        applied += force;
    }

    (applied, submerged / voxels.len() as f32)
}
