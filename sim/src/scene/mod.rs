//! Scene description for the headless simulation: water volumes and the
//! bodies dropped into them.

pub mod load_from_file;
pub mod spawn;

use bevy::math::{EulerRot, Quat, Vec3};
use bevy::prelude::{Resource, Transform};
use bevy_rapier3d::prelude::Collider;
use buoyancy::{BuoyancySettings, WaterSurfaceConfig, WavePreset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeConfig {
    Cuboid { half_extents: [f32; 3] },
    Ball { radius: f32 },
    Capsule { half_height: f32, radius: f32 },
}

impl ShapeConfig {
    pub fn collider(&self) -> Collider {
        match *self {
            ShapeConfig::Cuboid { half_extents: [x, y, z] } => Collider::cuboid(x, y, z),
            ShapeConfig::Ball { radius } => Collider::ball(radius),
            ShapeConfig::Capsule {
                half_height,
                radius,
            } => Collider::capsule_y(half_height, radius),
        }
    }
}

/// One collider of a compound body, placed relative to the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    pub shape: ShapeConfig,
    #[serde(default)]
    pub offset: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub name: String,
    /// World position of the grid's first vertex
    pub position: [f32; 3],
    pub surface: WaterSurfaceConfig,
    /// Replaces `surface.waves` when set
    pub preset: Option<WavePreset>,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            name: "water".into(),
            position: [-5.0, 0.0, -5.0],
            surface: WaterSurfaceConfig::default(),
            preset: None,
        }
    }
}

impl WaterConfig {
    pub fn surface_config(&self) -> WaterSurfaceConfig {
        let mut surface = self.surface.clone();
        if let Some(preset) = self.preset {
            surface.waves = preset.to_config();
        }
        surface
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(Vec3::from_array(self.position))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub name: String,
    /// Single collider on the body itself; ignored when `parts` is not empty
    pub shape: Option<ShapeConfig>,
    pub parts: Vec<PartConfig>,
    pub position: [f32; 3],
    /// Euler angles in degrees, applied Y then X then Z
    pub rotation: [f32; 3],
    pub density: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub buoyancy: Option<BuoyancySettings>,
    pub kinematic: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "body".into(),
            shape: Some(ShapeConfig::Cuboid {
                half_extents: [0.5, 0.5, 0.5],
            }),
            parts: Vec::new(),
            position: [0.0, 2.0, 0.0],
            rotation: [0.0; 3],
            density: 0.5,
            linear_damping: 0.0,
            angular_damping: 0.05,
            buoyancy: None,
            kinematic: false,
        }
    }
}

impl BodyConfig {
    pub fn transform(&self) -> Transform {
        let [x, y, z] = self.rotation.map(f32::to_radians);
        Transform::from_translation(Vec3::from_array(self.position))
            .with_rotation(Quat::from_euler(EulerRot::YXZ, y, x, z))
    }
}

/// Randomly placed crates on top of the listed bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub count: u32,
    pub seed: u64,
    /// Half width of the square the crates are dropped over
    pub extent: f32,
    pub height: f32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub gravity: f32,
    /// Top of a static floor under the water
    pub floor: Option<f32>,
    pub waters: Vec<WaterConfig>,
    pub bodies: Vec<BodyConfig>,
    pub scatter: Option<ScatterConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "harbour".into(),
            gravity: buoyancy::GRAVITY,
            floor: Some(-6.0),
            waters: vec![WaterConfig {
                name: "lake".into(),
                ..Default::default()
            }],
            bodies: vec![
                BodyConfig {
                    name: "crate".into(),
                    ..Default::default()
                },
                BodyConfig {
                    name: "buoy".into(),
                    shape: Some(ShapeConfig::Ball { radius: 0.4 }),
                    position: [2.5, 3.0, 1.0],
                    density: 0.8,
                    buoyancy: Some(BuoyancySettings {
                        voxel_fraction: 0.25,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                BodyConfig {
                    name: "barrel".into(),
                    shape: Some(ShapeConfig::Capsule {
                        half_height: 0.4,
                        radius: 0.3,
                    }),
                    position: [-2.0, 1.5, 2.0],
                    rotation: [0.0, 0.0, 80.0],
                    ..Default::default()
                },
                BodyConfig {
                    name: "raft".into(),
                    shape: None,
                    parts: vec![
                        PartConfig {
                            shape: ShapeConfig::Cuboid {
                                half_extents: [1.0, 0.15, 0.3],
                            },
                            offset: [0.0, 0.0, -0.35],
                        },
                        PartConfig {
                            shape: ShapeConfig::Cuboid {
                                half_extents: [1.0, 0.15, 0.3],
                            },
                            offset: [0.0, 0.0, 0.35],
                        },
                    ],
                    position: [0.0, 1.0, -2.5],
                    rotation: [30.0, 0.0, 0.0],
                    ..Default::default()
                },
                BodyConfig {
                    name: "anchor".into(),
                    position: [3.0, 2.0, -3.0],
                    density: 4.0,
                    buoyancy: Some(BuoyancySettings {
                        buoyancy: 0.3,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                BodyConfig {
                    name: "pontoon".into(),
                    shape: Some(ShapeConfig::Cuboid {
                        half_extents: [1.5, 0.2, 0.5],
                    }),
                    position: [-3.0, 0.0, -3.0],
                    kinematic: true,
                    ..Default::default()
                },
            ],
            scatter: None,
        }
    }
}

impl SceneConfig {
    /// Listed bodies followed by the scattered crates, if any.
    pub fn all_bodies(&self) -> Vec<BodyConfig> {
        let mut bodies = self.bodies.clone();
        if let Some(scatter) = self.scatter {
            bodies.extend(scatter_crates(&scatter));
        }
        bodies
    }
}

fn scatter_crates(scatter: &ScatterConfig) -> Vec<BodyConfig> {
    let mut rng = StdRng::seed_from_u64(scatter.seed);
    let extent = scatter.extent.abs().max(f32::EPSILON);
    (0..scatter.count)
        .map(|index| BodyConfig {
            name: format!("scatter-{index}"),
            shape: Some(ShapeConfig::Cuboid {
                half_extents: [
                    rng.gen_range(0.15..0.5),
                    rng.gen_range(0.15..0.5),
                    rng.gen_range(0.15..0.5),
                ],
            }),
            position: [
                rng.gen_range(-extent..extent),
                scatter.height + rng.gen_range(0.0..2.0),
                rng.gen_range(-extent..extent),
            ],
            rotation: [
                rng.gen_range(0.0..360.0),
                rng.gen_range(0.0..360.0),
                rng.gen_range(0.0..360.0),
            ],
            density: rng.gen_range(0.2..1.0),
            ..Default::default()
        })
        .collect()
}
