use bevy::math::{FloatExt, Vec3};
use bevy::transform::components::Transform;
use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use log::{debug, trace};

use super::collider::{ColliderShape, RigidBodyHandle};
use super::integrator::{buoyancy_force, integrate, BuoyancyStepReport};
use super::settings::BuoyancySettings;
use super::voxelizer::{voxelize, world_bounds};
use crate::water::WaterSurface;

/// Buoyancy state of one collider of a dynamic rigid body.
///
/// Voxels are computed on the first overlap with any water volume and kept
/// for the lifetime of the component.
#[derive(Component, Debug, Clone)]
pub struct FloatingBody {
    settings: BuoyancySettings,
    water: Option<Entity>,
    voxels: Option<Vec<Vec3>>,
    voxel_size: Vec3,
    initial_drag: f32,
    initial_angular_drag: f32,
    submerged_fraction: f32,
    last_report: Option<BuoyancyStepReport>,
}

impl FloatingBody {
    /// `initial_drag` and `initial_angular_drag` are the body's dry damping,
    /// restored whenever it is out of the water.
    pub fn new(settings: BuoyancySettings, initial_drag: f32, initial_angular_drag: f32) -> Self {
        Self {
            settings,
            water: None,
            voxels: None,
            voxel_size: Vec3::ZERO,
            initial_drag,
            initial_angular_drag,
            submerged_fraction: 0.0,
            last_report: None,
        }
    }

    pub fn settings(&self) -> &BuoyancySettings {
        &self.settings
    }

    /// Water volume the body is currently overlapping, if any.
    pub fn water(&self) -> Option<Entity> {
        self.water
    }

    pub fn voxels(&self) -> &[Vec3] {
        self.voxels.as_deref().unwrap_or(&[])
    }

    pub fn is_voxelized(&self) -> bool {
        self.voxels.is_some()
    }

    pub fn voxel_size(&self) -> Vec3 {
        self.voxel_size
    }

    pub fn dry_damping(&self) -> (f32, f32) {
        (self.initial_drag, self.initial_angular_drag)
    }

    /// Mean submerged factor of the last step.
    pub fn submerged_fraction(&self) -> f32 {
        self.submerged_fraction
    }

    /// Report of the last step that applied forces, cleared once out of water.
    pub fn last_report(&self) -> Option<&BuoyancyStepReport> {
        self.last_report.as_ref()
    }

    pub fn on_overlap_enter(&mut self, water: Entity, shape: &impl ColliderShape) {
        if self.voxels.is_none() {
            let grid = voxelize(shape, self.settings.voxel_fraction);
            self.voxel_size = grid.voxel_size;
            self.voxels = Some(grid.points);
        }
        debug!("Entered water volume {water:?}");
        self.water = Some(water);
    }

    /// Forgets `water` unless the body has since entered another volume.
    pub fn on_overlap_exit(&mut self, water: Entity) {
        if self.water == Some(water) {
            debug!("Left water volume {water:?}");
            self.water = None;
        }
    }

    /// Applies this step's buoyancy and interpolated damping. Returns `None`
    /// when the body is not in water or has no voxels yet.
    ///
    /// The scale of `transform` is ignored: it is already part of `shape`.
    pub fn on_fixed_step(
        &mut self,
        surface: &WaterSurface,
        shape: &impl ColliderShape,
        transform: &Transform,
        body: &mut impl RigidBodyHandle,
        gravity: f32,
    ) -> Option<BuoyancyStepReport> {
        self.last_report = None;
        self.water?;
        let voxels = self.voxels.as_deref().filter(|voxels| !voxels.is_empty())?;

        let pose = transform.with_scale(Vec3::ONE);
        let (min, max) = world_bounds(&pose.compute_affine(), &shape.local_aabb());
        let voxel_height = (max.y - min.y) * self.settings.voxel_fraction;
        let total = buoyancy_force(gravity, body.mass(), self.settings.buoyancy);

        let (applied, fraction) = integrate(voxels, &pose, voxel_height, surface, total, body);
        self.submerged_fraction = fraction;

        let linear = self.initial_drag.lerp(self.settings.drag_in_water, fraction);
        let angular = self
            .initial_angular_drag
            .lerp(self.settings.angular_drag_in_water, fraction);
        body.set_damping(linear, angular);

        trace!("Buoyancy step: force {applied:?}, submerged {fraction:.3}");

        let report = BuoyancyStepReport {
            total_force: applied,
            submerged_fraction: fraction,
            linear_damping: linear,
            angular_damping: angular,
            voxel_count: voxels.len(),
        };
        self.last_report = Some(report);
        Some(report)
    }
}
