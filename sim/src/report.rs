use std::collections::HashMap;

use bevy::prelude::*;
use bevy_log::info;
use bevy_rapier3d::prelude::Velocity;
use buoyancy::FloatingBody;

use crate::scene::spawn::SceneBody;

#[derive(Resource, Debug, Clone, Copy)]
pub struct SimSettings {
    /// Fixed steps to run before exiting
    pub ticks: u64,
    pub report_every: u64,
}

#[derive(Resource, Debug, Default)]
pub struct TickCounter(pub u64);

pub fn count_ticks(
    mut counter: ResMut<TickCounter>,
    settings: Res<SimSettings>,
    mut exit: EventWriter<AppExit>,
) {
    counter.0 += 1;
    if counter.0 == settings.ticks {
        info!("Simulation finished after {} ticks", counter.0);
        exit.write(AppExit::Success);
    }
}

/// Mean submersion and summed buoyant force per rigid body, from the
/// colliders that applied forces in the last step.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BodySubmersion {
    pub fraction: f32,
    pub force: Vec3,
    pub colliders: usize,
}

pub fn collect_submersion<'a>(
    floating: impl Iterator<Item = (Entity, &'a FloatingBody, Option<&'a ChildOf>)>,
) -> HashMap<Entity, BodySubmersion> {
    let mut per_body: HashMap<Entity, BodySubmersion> = HashMap::new();
    for (entity, body, child_of) in floating {
        let Some(report) = body.last_report() else {
            continue;
        };
        let owner = child_of.map_or(entity, ChildOf::parent);
        let entry = per_body.entry(owner).or_default();
        entry.colliders += 1;
        entry.force += report.total_force;
        entry.fraction += (report.submerged_fraction - entry.fraction) / entry.colliders as f32;
    }
    per_body
}

pub fn report_bodies(
    counter: Res<TickCounter>,
    settings: Res<SimSettings>,
    bodies: Query<(Entity, &Name, &GlobalTransform, Option<&Velocity>), With<SceneBody>>,
    floating: Query<(Entity, &FloatingBody, Option<&ChildOf>)>,
) {
    if counter.0 == 0 || counter.0 % settings.report_every != 0 {
        return;
    }

    let submersion = collect_submersion(floating.iter());
    info!("tick {}", counter.0);
    for (entity, name, transform, velocity) in bodies.iter() {
        let state = submersion.get(&entity).copied().unwrap_or_default();
        info!(
            "  {:<12} y={:>7.3} speed={:>6.3} submerged={:>5.1}% force={:>8.2}",
            name.as_str(),
            transform.translation().y,
            velocity.map_or(0.0, |velocity| velocity.linvel.length()),
            state.fraction * 100.0,
            state.force.y,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy_rapier3d::prelude::Collider;
    use buoyancy::{BuoyancySettings, WaterSurface, WaterSurfaceConfig, WavePreset};

    fn stepped(level: f32, at: Vec3) -> FloatingBody {
        struct Sink;
        impl buoyancy::RigidBodyHandle for Sink {
            fn mass(&self) -> f32 {
                1.0
            }
            fn apply_force_at_point(&mut self, _: Vec3, _: Vec3) {}
            fn linear_damping(&self) -> f32 {
                0.0
            }
            fn angular_damping(&self) -> f32 {
                0.0
            }
            fn set_damping(&mut self, _: f32, _: f32) {}
        }

        let surface = WaterSurface::new(
            &WaterSurfaceConfig {
                waves: WavePreset::Still.to_config(),
                ..Default::default()
            },
            Transform::from_xyz(-5.0, level, -5.0),
        );
        let collider = Collider::cuboid(0.5, 0.5, 0.5);
        let transform = Transform::from_translation(at);
        let mut body = FloatingBody::new(BuoyancySettings::default(), 0.0, 0.0);
        body.on_overlap_enter(Entity::from_raw(99), &collider);
        body.on_fixed_step(&surface, &collider, &transform, &mut Sink, 9.81);
        body
    }

    #[test]
    fn test_collect_submersion_averages_compound_parts() {
        let mut world = World::new();
        let raft = world.spawn_empty().id();
        let deep = world.spawn((stepped(10.0, Vec3::ZERO), ChildOf(raft))).id();
        let dry = world.spawn((stepped(-10.0, Vec3::ZERO), ChildOf(raft))).id();
        let single = world.spawn(stepped(0.0, Vec3::ZERO)).id();

        let mut query = world.query::<(Entity, &FloatingBody, Option<&ChildOf>)>();
        let per_body = collect_submersion(query.iter(&world));

        assert_eq!(per_body.len(), 2);
        let raft_state = per_body[&raft];
        assert_eq!(raft_state.colliders, 2);
        assert!((raft_state.fraction - 0.5).abs() < 1e-5);
        assert!((per_body[&single].fraction - 0.5).abs() < 1e-5);
        assert!(!per_body.contains_key(&deep) && !per_body.contains_key(&dry));
    }

    #[test]
    fn test_exits_after_tick_budget() {
        let mut world = World::new();
        world.init_resource::<Events<AppExit>>();
        world.init_resource::<TickCounter>();
        world.insert_resource(SimSettings {
            ticks: 2,
            report_every: 1,
        });

        world.run_system_once(count_ticks).unwrap();
        assert!(world.resource::<Events<AppExit>>().is_empty());
        world.run_system_once(count_ticks).unwrap();
        assert_eq!(world.resource::<Events<AppExit>>().len(), 1);
        assert_eq!(world.resource::<TickCounter>().0, 2);
    }
}
