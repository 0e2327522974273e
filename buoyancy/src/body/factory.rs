use log::{debug, warn};

use super::floating::FloatingBody;
use super::settings::BuoyancySettings;

/// What the host engine knows about a collider that started overlapping water.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlapCandidate {
    /// Collider belongs to a rigid body, either directly or through its parent
    pub has_rigid_body: bool,
    pub kinematic: bool,
    pub already_buoyant: bool,
    /// Collider sits on a child of the rigid body rather than on the body itself
    pub compound: bool,
    /// Non-trigger colliders sharing the rigid body
    pub solid_colliders: usize,
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Per-body override of the plugin-wide settings
    pub settings: Option<BuoyancySettings>,
}

/// Decides which colliders become buoyant when they touch water.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuoyancyFactory {
    pub defaults: BuoyancySettings,
}

impl BuoyancyFactory {
    pub fn new(defaults: BuoyancySettings) -> Self {
        Self { defaults }
    }

    /// Builds the component to attach to the candidate collider, or `None`
    /// when the candidate must be left alone.
    ///
    /// Compound bodies divide the buoyancy coefficient between their solid
    /// colliders so the body as a whole floats like a single collider would.
    pub fn attach(&self, candidate: &OverlapCandidate) -> Option<FloatingBody> {
        if !candidate.has_rigid_body || candidate.kinematic || candidate.already_buoyant {
            return None;
        }

        let settings = candidate.settings.unwrap_or(self.defaults);
        if let Err(err) = settings.validate() {
            warn!("Ignoring invalid buoyancy settings: {err}");
            return None;
        }

        let settings = if candidate.compound {
            settings.split_between(candidate.solid_colliders)
        } else {
            settings
        };
        debug!(
            "Attaching buoyancy (coefficient {:.3}, compound: {})",
            settings.buoyancy, candidate.compound
        );

        Some(FloatingBody::new(
            settings,
            candidate.linear_damping,
            candidate.angular_damping,
        ))
    }
}
