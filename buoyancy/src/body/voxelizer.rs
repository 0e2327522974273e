//! Decomposes a collider into a regular grid of interior sample points.

use bevy::math::{bounding::Aabb3d, Affine3A, Vec3};
use log::debug;

use super::collider::ColliderShape;

/// Sample points produced for one body, in the body's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    /// Accepted centres in scan order (x outer, y middle, z inner)
    pub points: Vec<Vec3>,
    /// Edge lengths of one voxel, measured on the unrotated bounds
    pub voxel_size: Vec3,
    pub per_axis: u32,
}

/// Voxels along each axis for a normalized voxel size, e.g. 0.5 -> 2.
pub fn voxels_per_axis(fraction: f32) -> u32 {
    ((1.0 / fraction).round_ties_even() as u32).max(1)
}

/// Axis-aligned bounds of `aabb` after `affine` is applied to its corners.
pub(crate) fn world_bounds(affine: &Affine3A, aabb: &Aabb3d) -> (Vec3, Vec3) {
    let (lo, hi) = (Vec3::from(aabb.min), Vec3::from(aabb.max));
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for corner in 0..8 {
        let local = Vec3::new(
            if corner & 1 == 0 { lo.x } else { hi.x },
            if corner & 2 == 0 { lo.y } else { hi.y },
            if corner & 4 == 0 { lo.z } else { hi.z },
        );
        let world = affine.transform_point3(local);
        min = min.min(world);
        max = max.max(world);
    }
    (min, max)
}

/// Scans `per_axis³` candidate centres over the collider bounds and keeps the
/// ones inside the collider.
///
/// The scan runs in the collider's own frame, so the grid stays aligned with
/// its axes whatever the body's current rotation. Returned points are
/// collider-local and already include the collider's scale.
pub fn voxelize(shape: &impl ColliderShape, fraction: f32) -> VoxelGrid {
    let aabb = shape.local_aabb();
    let min = Vec3::from(aabb.min);
    let voxel_size = (Vec3::from(aabb.max) - min) * fraction;
    let per_axis = voxels_per_axis(fraction);

    let mut points = Vec::with_capacity((per_axis * per_axis * per_axis) as usize);
    for i in 0..per_axis {
        for j in 0..per_axis {
            for k in 0..per_axis {
                let cell = Vec3::new(i as f32, j as f32, k as f32) + 0.5;
                let local = min + voxel_size * cell;
                if is_inside(shape, local) {
                    points.push(local);
                }
            }
        }
    }

    debug!(
        "Voxelized collider into {}/{} samples (size {:?})",
        points.len(),
        per_axis * per_axis * per_axis,
        voxel_size
    );

    VoxelGrid {
        points,
        voxel_size,
        per_axis,
    }
}

/// A candidate is kept when it lies in the shape and, for shapes containing
/// their origin, the segment back to the origin stays inside as well.
fn is_inside(shape: &impl ColliderShape, local: Vec3) -> bool {
    if !shape.contains_local_point(local) {
        return false;
    }
    if local.length_squared() <= f32::EPSILON || !shape.contains_local_point(Vec3::ZERO) {
        return true;
    }
    // Leaving the surface on the way out from the origin means the segment
    // crosses it before reaching the candidate.
    !matches!(
        shape.cast_local_ray(Vec3::ZERO, local, 1.0),
        Some(toi) if toi < 1.0 - SEGMENT_EPSILON
    )
}

const SEGMENT_EPSILON: f32 = 1e-4;
