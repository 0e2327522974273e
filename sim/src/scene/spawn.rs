use bevy::prelude::*;
use bevy_log::{info, warn};
use bevy_rapier3d::prelude::*;
use buoyancy::body::ensure_collider;
use buoyancy::{water_volume_bundle, BuoyancyOverride};

use super::{BodyConfig, SceneConfig};

/// Marks bodies spawned from the scene file, for reporting.
#[derive(Component, Debug, Clone)]
pub struct SceneBody;

pub fn spawn_scene(mut commands: Commands, scene: Res<SceneConfig>) {
    if let Some(top) = scene.floor {
        commands.spawn((
            Name::new("floor"),
            Collider::cuboid(50.0, 0.5, 50.0),
            Transform::from_xyz(0.0, top - 0.5, 0.0),
        ));
    }

    for water in &scene.waters {
        let surface = water.surface_config();
        if let Err(err) = surface.validate() {
            warn!("Skipping water volume {}: {err}", water.name);
            continue;
        }
        commands.spawn((
            Name::new(water.name.clone()),
            water_volume_bundle(&surface, water.transform()),
        ));
    }

    let bodies = scene.all_bodies();
    for body in &bodies {
        spawn_body(&mut commands, body);
    }

    info!(
        "Spawned scene \"{}\": {} water volume(s), {} bodies",
        scene.name,
        scene.waters.len(),
        bodies.len()
    );
}

fn spawn_body(commands: &mut Commands, body: &BodyConfig) {
    let rigid_body = if body.kinematic {
        RigidBody::KinematicPositionBased
    } else {
        RigidBody::Dynamic
    };
    let mut entity = commands.spawn((
        Name::new(body.name.clone()),
        SceneBody,
        rigid_body,
        body.transform(),
        Velocity::default(),
        ReadMassProperties::default(),
        ExternalForce::default(),
        Damping {
            linear_damping: body.linear_damping,
            angular_damping: body.angular_damping,
        },
    ));

    if body.parts.is_empty() {
        let collider = ensure_collider(&body.name, body.shape.map(|shape| shape.collider()));
        entity.insert((
            collider,
            ColliderMassProperties::Density(body.density),
            ActiveEvents::COLLISION_EVENTS,
        ));
        if let Some(settings) = body.buoyancy {
            entity.insert(BuoyancyOverride(settings));
        }
        return;
    }

    entity.with_children(|parent| {
        for (index, part) in body.parts.iter().enumerate() {
            let mut child = parent.spawn((
                Name::new(format!("{}-part-{index}", body.name)),
                part.shape.collider(),
                Transform::from_translation(Vec3::from_array(part.offset)),
                ColliderMassProperties::Density(body.density),
                ActiveEvents::COLLISION_EVENTS,
            ));
            if let Some(settings) = body.buoyancy {
                child.insert(BuoyancyOverride(settings));
            }
        }
    });
}

/// Points Rapier's gravity at the scene's value.
pub fn configure_gravity(scene: Res<SceneConfig>, mut configs: Query<&mut RapierConfiguration>) {
    for mut config in configs.iter_mut() {
        config.gravity = Vec3::NEG_Y * scene.gravity;
    }
}
