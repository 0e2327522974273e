//! Seams to the collision and rigid-body engine.

use bevy::math::{bounding::Aabb3d, Vec3};
use bevy_rapier3d::prelude::Collider;
use log::warn;

use crate::constants::MISSING_COLLIDER_WARNING;

/// Shape queries the voxelizer needs, expressed in the collider's local frame.
///
/// The shape already carries its entity's scale (Rapier bakes the global
/// scale into the collider), so callers pair it with translation and
/// rotation only.
pub trait ColliderShape {
    /// Axis-aligned bounds of the shape in collider-local coordinates.
    fn local_aabb(&self) -> Aabb3d;

    fn contains_local_point(&self, point: Vec3) -> bool;

    /// Time of impact of the ray `origin + dir * t` with the shape's surface,
    /// for `t` in `[0, max_toi]`. A ray starting inside the shape reports
    /// where it leaves the surface, not `0`.
    fn cast_local_ray(&self, origin: Vec3, dir: Vec3, max_toi: f32) -> Option<f32>;
}

impl ColliderShape for Collider {
    fn local_aabb(&self) -> Aabb3d {
        let aabb = self.raw.compute_local_aabb();
        Aabb3d {
            min: Vec3::new(aabb.mins.x, aabb.mins.y, aabb.mins.z).into(),
            max: Vec3::new(aabb.maxs.x, aabb.maxs.y, aabb.maxs.z).into(),
        }
    }

    fn contains_local_point(&self, point: Vec3) -> bool {
        Collider::contains_local_point(self, point)
    }

    fn cast_local_ray(&self, origin: Vec3, dir: Vec3, max_toi: f32) -> Option<f32> {
        Collider::cast_local_ray(self, origin, dir, max_toi, false)
    }
}

/// Mass, force application and drag of the body a floating collider belongs to.
pub trait RigidBodyHandle {
    fn mass(&self) -> f32;

    /// Accumulate a world-space force applied at a world-space point.
    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3);

    fn linear_damping(&self) -> f32;

    fn angular_damping(&self) -> f32;

    fn set_damping(&mut self, linear: f32, angular: f32);
}

/// Returns the collider or, for a body configured without one, a unit box.
pub fn ensure_collider(name: &str, collider: Option<Collider>) -> Collider {
    match collider {
        Some(collider) => collider,
        None => {
            warn!("Buoyancy: object \"{name}\" {MISSING_COLLIDER_WARNING}");
            Collider::cuboid(0.5, 0.5, 0.5)
        }
    }
}
